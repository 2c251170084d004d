use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecohabit_tracker::models::UserStreak;
use ecohabit_tracker::services::badges::{satisfies, UserFactsView};
use ecohabit_tracker::services::BadgeCatalog;

fn benchmark_streak_transitions(c: &mut Criterion) {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    // A year of daily actions with occasional gaps that break the streak
    let dates: Vec<chrono::NaiveDate> = (0..365i64)
        .map(|i| start + chrono::Duration::days(i + (i % 17) / 4))
        .collect();

    c.bench_function("apply_action_year", |b| {
        b.iter(|| {
            let mut streak = UserStreak::new("bench-user");
            for date in &dates {
                streak.apply_action(black_box(*date), 3, "now");
            }
            streak.current_streak
        })
    });
}

fn benchmark_badge_evaluation(c: &mut Criterion) {
    let catalog = BadgeCatalog::seed().expect("Failed to seed catalog");

    let mut view = UserFactsView {
        current_streak: 12,
        total_actions: 87,
        groups_joined: 2,
        actions_by_category: Default::default(),
    };
    view.actions_by_category.insert("transport".to_string(), 40);
    view.actions_by_category.insert("energy".to_string(), 30);
    view.actions_by_category.insert("waste".to_string(), 17);

    c.bench_function("evaluate_full_catalog", |b| {
        b.iter(|| {
            catalog
                .badges()
                .iter()
                .filter(|badge| satisfies(black_box(badge), black_box(&view)))
                .count()
        })
    });
}

criterion_group!(benches, benchmark_streak_transitions, benchmark_badge_evaluation);
criterion_main!(benches);
