//! Weighted roulette — выбор опции пропорционально весу

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedOption<T> {
    pub option: T,
    pub weight: f32,
}

impl<T> WeightedOption<T> {
    pub fn new(option: T, weight: f32) -> Self {
        Self { option, weight }
    }
}

/// Сумма положительных весов (отрицательные считаются нулём)
pub fn total_weight<T>(options: &[WeightedOption<T>]) -> f32 {
    options.iter().map(|o| o.weight.max(0.0)).sum()
}

/// Детерминированная часть: первая опция, чей накопленный вес ≥ `sample`.
/// Пустой список → `T::default()`; sample за пределами суммы → последняя опция.
pub fn select_with<T: Clone + Default>(options: &[WeightedOption<T>], sample: f32) -> T {
    let mut cumulative = 0.0;
    for entry in options {
        cumulative += entry.weight.max(0.0);
        if cumulative >= sample {
            return entry.option.clone();
        }
    }
    options
        .last()
        .map(|entry| entry.option.clone())
        .unwrap_or_default()
}

/// Roulette: sample ∈ [0, W] из переданного RNG
pub fn select_option<T: Clone + Default, R: Rng + ?Sized>(
    options: &[WeightedOption<T>],
    rng: &mut R,
) -> T {
    let total = total_weight(options);
    let sample = if total > 0.0 {
        rng.gen_range(0.0..=total)
    } else {
        0.0
    };
    select_with(options, sample)
}
