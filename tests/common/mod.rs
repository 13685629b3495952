#![allow(dead_code)]

use rentwise::application::optimization::grid_search::{GridSearchTrainer, ParameterGrid};
use rentwise::domain::apartment::RawRecord;

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

/// Synthetic listings where rent grows with area and a balcony adds a premium.
pub fn apartments(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            let area = 30.0 + (i * 7 % 90) as f64;
            let garden = if i % 3 == 0 {
                "Not present".to_string()
            } else {
                format!("{}m2", 5 + i % 40)
            };
            RawRecord {
                area,
                constraction_year: 1960.0 + (i % 60) as f64,
                bedrooms: (1 + i % 4) as f64,
                garden,
                balcony: yes_no(i % 2 == 0),
                parking: yes_no(i % 3 == 0),
                furnished: yes_no(i % 4 == 0),
                garage: yes_no(i % 5 == 0),
                storage: yes_no(i % 2 == 1),
                rent: 400.0 + 12.0 * area + if i % 2 == 0 { 80.0 } else { 0.0 },
            }
        })
        .collect()
}

/// A 2x2 grid with 3 folds, fast enough for tests
pub fn small_trainer(seed: u64) -> GridSearchTrainer {
    let grid = ParameterGrid {
        n_estimators: vec![5, 10],
        max_depth: vec![3, 6],
    };
    GridSearchTrainer::new(grid, 3, seed)
}

pub fn to_csv(records: &[RawRecord]) -> String {
    let mut out = String::from(
        "area,constraction_year,bedrooms,garden,balcony,parking,furnished,garage,storage,rent\n",
    );
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            r.area,
            r.constraction_year,
            r.bedrooms,
            r.garden,
            r.balcony,
            r.parking,
            r.furnished,
            r.garage,
            r.storage,
            r.rent
        ));
    }
    out
}
