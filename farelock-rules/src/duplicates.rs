use std::collections::HashMap;

use farelock_core::Passenger;

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Find groups of duplicate passengers: same normalized last name,
/// first name and birth date. Returns the indices of each group with
/// two or more members; empty when the booking has no duplicates.
/// Drafts with no birth date yet are never considered duplicates.
pub fn find_duplicates(passengers: &[Passenger]) -> Vec<Vec<usize>> {
    let mut groups: HashMap<(String, String, String), Vec<usize>> = HashMap::new();

    for (idx, passenger) in passengers.iter().enumerate() {
        let Some(birth_date) = passenger.birth_date else { continue };
        let key = (
            normalize(&passenger.last_name),
            normalize(&passenger.first_name),
            birth_date.to_string(),
        );
        groups.entry(key).or_default().push(idx);
    }

    let mut duplicates: Vec<Vec<usize>> = groups.into_values().filter(|g| g.len() > 1).collect();
    duplicates.sort();
    duplicates
}
