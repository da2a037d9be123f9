use time::{util::days_in_year_month, Date};

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Weeks of the month containing `date`, Monday first. Padding cells are `None`.
pub fn month_grid(date: Date) -> Vec<[Option<u8>; 7]> {
    let lead = (i32::from(date.weekday().number_days_from_monday()) - (i32::from(date.day()) - 1))
        .rem_euclid(7) as usize;
    let days = days_in_year_month(date.year(), date.month());

    let mut cells: Vec<Option<u8>> = vec![None; lead];
    cells.extend((1..=days).map(Some));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    cells
        .chunks(7)
        .map(|chunk| {
            let mut week = [None; 7];
            week.copy_from_slice(chunk);
            week
        })
        .collect()
}

pub fn month_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}
