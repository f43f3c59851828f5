//! Grouping particle columns into named groups by a fixed count table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::trajectory::TableError;

/// One entry of the count table
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    pub count: usize, // particles in the group
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleGroup {
    pub name: String,
    pub particles: Vec<usize>, // particle indices into the table
}

/// Assign particles `0..particle_count` to groups in table order.
///
/// Group `g` owns the indices from the sum of the previous counts up to
/// that sum plus its own count. Indices past `particle_count` are dropped,
/// so groups past the end of the table come out short or empty.
pub fn group_particles(specs: &[GroupSpec], particle_count: usize) -> Result<Vec<ParticleGroup>, TableError> {
    let mut seen = HashSet::new();
    let mut groups = Vec::with_capacity(specs.len());
    let mut idx: usize = 0;

    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(TableError::DuplicateGroup(spec.name.clone()));
        }
        let end = idx.saturating_add(spec.count);
        let particles = (idx.min(particle_count)..end.min(particle_count)).collect();
        idx = end;
        groups.push(ParticleGroup {
            name: spec.name.clone(),
            particles,
        });
    }

    Ok(groups)
}

/// Count table of `size`-particle groups covering every particle,
/// the last group takes the remainder
pub fn uniform_groups(particle_count: usize, size: usize) -> Vec<GroupSpec> {
    let size = size.max(1);
    (0..particle_count.div_ceil(size))
        .map(|g| GroupSpec {
            name: format!("Group {}", g + 1),
            count: size.min(particle_count - g * size),
        })
        .collect()
}

/// First particle of every non-empty group, sorted by group name
pub fn first_particles(groups: &[ParticleGroup]) -> Vec<(String, usize)> {
    let mut firsts: Vec<(String, usize)> = groups
        .iter()
        .filter_map(|g| g.particles.first().map(|&p| (g.name.clone(), p)))
        .collect();
    firsts.sort();
    firsts
}
