//! NavGrid: 8-связный grid поверх прямоугольной области + A* с сглаживанием пути

use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::shared::{ObstacleQuery, Obstacles};

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;
/// Порог dot для сглаживания: ниже — поворот существенный, waypoint остаётся
const SMOOTHING_DOT: f32 = 0.9;

#[derive(Debug, Error, PartialEq)]
pub enum NavGridError {
    #[error("grid size must be positive, got {0:?}")]
    InvalidSize(Vec2),
    #[error("node radius must be positive, got {0}")]
    InvalidNodeRadius(f32),
    #[error("grid {size:?} is smaller than one node of diameter {diameter}")]
    Empty { size: Vec2, diameter: f32 },
}

/// Клетка grid'а (статические данные; A* стоимости живут в scratch буфере поиска)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNode {
    pub grid_x: usize,
    pub grid_y: usize,
    pub world_position: Vec3,
    pub walkable: bool,
}

/// Результат поиска: waypoints (без стартовой клетки, сглаженные) + число раскрытых узлов
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSearch {
    pub waypoints: Vec<Vec3>,
    pub expanded: usize,
}

/// Resource: pathfinder арены
#[derive(Resource, Debug, Clone)]
pub struct NavGrid {
    center: Vec3,
    size: Vec2,
    node_radius: f32,
    count_x: usize,
    count_y: usize,
    nodes: Vec<GridNode>,
    /// Копия геометрии для linecast при сглаживании
    obstacles: Obstacles,
}

/// Scratch данные A* для одной клетки
#[derive(Debug, Clone, Copy)]
struct SearchCell {
    g: u32,
    parent: Option<usize>,
    closed: bool,
}

impl Default for SearchCell {
    fn default() -> Self {
        Self {
            g: u32::MAX,
            parent: None,
            closed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    h: u32,
    g: u32,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: меньший f, при равенстве меньший h (жаднее к цели)
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl NavGrid {
    /// Строит grid: count = round(size / diameter), walkable = !check_sphere(node, radius)
    pub fn build(
        center: Vec3,
        size: Vec2,
        node_radius: f32,
        obstacles: &Obstacles,
    ) -> Result<Self, NavGridError> {
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(NavGridError::InvalidSize(size));
        }
        if !(node_radius > 0.0) {
            return Err(NavGridError::InvalidNodeRadius(node_radius));
        }

        let diameter = node_radius * 2.0;
        let count_x = (size.x / diameter).round() as usize;
        let count_y = (size.y / diameter).round() as usize;
        if count_x == 0 || count_y == 0 {
            return Err(NavGridError::Empty { size, diameter });
        }

        let bottom_left = Vec3::new(center.x - size.x * 0.5, 0.0, center.z - size.y * 0.5);

        let mut nodes = Vec::with_capacity(count_x * count_y);
        for grid_y in 0..count_y {
            for grid_x in 0..count_x {
                let world_position = bottom_left
                    + Vec3::new(
                        grid_x as f32 * diameter + node_radius,
                        0.0,
                        grid_y as f32 * diameter + node_radius,
                    );
                nodes.push(GridNode {
                    grid_x,
                    grid_y,
                    world_position,
                    walkable: !obstacles.check_sphere(world_position, node_radius),
                });
            }
        }

        Ok(Self {
            center,
            size,
            node_radius,
            count_x,
            count_y,
            nodes,
            obstacles: obstacles.clone(),
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.count_x, self.count_y)
    }

    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    pub fn node(&self, grid_x: usize, grid_y: usize) -> Option<&GridNode> {
        if grid_x >= self.count_x || grid_y >= self.count_y {
            return None;
        }
        self.nodes.get(grid_y * self.count_x + grid_x)
    }

    /// World → клетка через нормализованный процент (clamp [0,1]): точки вне grid'а
    /// попадают в крайние клетки.
    pub fn node_from_world(&self, position: Vec3) -> Option<&GridNode> {
        self.index_from_world(position).map(|i| &self.nodes[i])
    }

    fn index_from_world(&self, position: Vec3) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let percent_x =
            ((position.x - self.center.x + self.size.x * 0.5) / self.size.x).clamp(0.0, 1.0);
        let percent_y =
            ((position.z - self.center.z + self.size.y * 0.5) / self.size.y).clamp(0.0, 1.0);

        let grid_x = ((self.count_x - 1) as f32 * percent_x).round() as usize;
        let grid_y = ((self.count_y - 1) as f32 * percent_y).round() as usize;
        Some(grid_y * self.count_x + grid_x)
    }

    /// Лежит ли точка внутри прямоугольника grid'а
    pub fn contains(&self, position: Vec3) -> bool {
        let half = self.size * 0.5;
        (position.x - self.center.x).abs() <= half.x && (position.z - self.center.z).abs() <= half.y
    }

    /// Прижимает точку к прямоугольнику grid'а (y сохраняется)
    pub fn clamp_to_grid(&self, position: Vec3) -> Vec3 {
        let half = self.size * 0.5;
        Vec3::new(
            position.x.clamp(self.center.x - half.x, self.center.x + half.x),
            position.y,
            position.z.clamp(self.center.z - half.y, self.center.z + half.y),
        )
    }

    pub fn find_path(&self, start: Vec3, target: Vec3) -> Vec<Vec3> {
        self.search(start, target).waypoints
    }

    /// A* от клетки start до клетки target
    pub fn search(&self, start: Vec3, target: Vec3) -> PathSearch {
        let (Some(start_index), Some(target_index)) =
            (self.index_from_world(start), self.index_from_world(target))
        else {
            return PathSearch::default();
        };

        // Недостижимая цель — сразу пусто, без единой итерации
        if !self.nodes[target_index].walkable {
            return PathSearch::default();
        }

        let mut cells = vec![SearchCell::default(); self.nodes.len()];
        let mut open = BinaryHeap::new();
        let mut expanded = 0;

        cells[start_index].g = 0;
        let h = self.distance(start_index, target_index);
        open.push(OpenEntry {
            f: h,
            h,
            g: 0,
            index: start_index,
        });

        while let Some(current) = open.pop() {
            // Устаревшая запись (узел уже закрыт или найден путь дешевле)
            if cells[current.index].closed || current.g != cells[current.index].g {
                continue;
            }
            cells[current.index].closed = true;
            expanded += 1;

            if current.index == target_index {
                let path = self.retrace(&cells, start_index, target_index);
                return PathSearch {
                    waypoints: self.smooth(path),
                    expanded,
                };
            }

            for neighbour in self.neighbours(current.index) {
                if !self.nodes[neighbour].walkable || cells[neighbour].closed {
                    continue;
                }

                let g = current.g + self.distance(current.index, neighbour);
                if g < cells[neighbour].g {
                    cells[neighbour].g = g;
                    cells[neighbour].parent = Some(current.index);
                    let h = self.distance(neighbour, target_index);
                    open.push(OpenEntry {
                        f: g + h,
                        h,
                        g,
                        index: neighbour,
                    });
                }
            }
        }

        PathSearch {
            waypoints: Vec::new(),
            expanded,
        }
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let x = (index % self.count_x) as isize;
        let y = (index / self.count_x) as isize;
        let (count_x, count_y) = (self.count_x as isize, self.count_y as isize);

        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                (nx >= 0 && nx < count_x && ny >= 0 && ny < count_y)
                    .then(|| (ny * count_x + nx) as usize)
            })
    }

    /// Octile дистанция в fixed-point: 14 по диагонали, 10 по прямой
    fn distance(&self, a: usize, b: usize) -> u32 {
        let dx = (a % self.count_x).abs_diff(b % self.count_x) as u32;
        let dy = (a / self.count_x).abs_diff(b / self.count_x) as u32;
        if dx > dy {
            DIAGONAL_COST * dy + STRAIGHT_COST * (dx - dy)
        } else {
            DIAGONAL_COST * dx + STRAIGHT_COST * (dy - dx)
        }
    }

    /// Путь от target назад по parent'ам; стартовая клетка не входит
    fn retrace(&self, cells: &[SearchCell], start: usize, target: usize) -> Vec<Vec3> {
        let mut path = Vec::new();
        let mut current = target;
        while current != start {
            path.push(self.nodes[current].world_position);
            match cells[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Убирает промежуточные точки без заметного поворота, если отрезок
    /// через них свободен. Первая и последняя точки сохраняются.
    fn smooth(&self, path: Vec<Vec3>) -> Vec<Vec3> {
        if path.len() <= 2 {
            return path;
        }

        let mut cleaned = Vec::with_capacity(path.len());
        cleaned.push(path[0]);

        for i in 1..path.len() - 1 {
            let (previous, current, next) = (path[i - 1], path[i], path[i + 1]);
            let direction_to_next = (next - previous).normalize_or_zero();
            let direction_to_current = (current - previous).normalize_or_zero();

            if direction_to_next.dot(direction_to_current) < SMOOTHING_DOT
                || self.obstacles.linecast(previous, next)
            {
                cleaned.push(current);
            }
        }

        cleaned.push(path[path.len() - 1]);
        cleaned
    }
}
