use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use quartermaster::board::TerritoryGraph;
use quartermaster::eval::{CombatEstimator, DistanceValueModel, SimulatedCombat, ValueModel};
use quartermaster::protocol::parse_scenario;
use quartermaster::purchase::{plan_purchase, Collaborators};

/// Two-front map: Germany between Russia and Britain, with the Baltic and
/// the North Sea.
const SCENARIO: &str = r#"{
    "players": [
        { "name": "Germany", "alliance": "Axis", "capital": "Berlin" },
        { "name": "Russia", "alliance": "Allies", "capital": "Moscow" },
        { "name": "Britain", "alliance": "Allies", "capital": "London" }
    ],
    "unit_types": [
        { "name": "infantry", "category": "land", "cost": 3, "attack": 1, "defense": 2, "movement": 1, "transport_cost": 2 },
        { "name": "artillery", "category": "land", "cost": 4, "attack": 2, "defense": 2, "movement": 1, "transport_cost": 3 },
        { "name": "armour", "category": "land", "cost": 6, "attack": 3, "defense": 3, "movement": 2, "transport_cost": 3 },
        { "name": "fighter", "category": "air", "cost": 10, "attack": 3, "defense": 4, "movement": 4 },
        { "name": "bomber", "category": "air", "cost": 12, "attack": 4, "defense": 1, "movement": 6 },
        { "name": "transport", "category": "sea", "cost": 7, "movement": 2, "transport_capacity": 5 },
        { "name": "submarine", "category": "sea", "cost": 6, "attack": 2, "defense": 1, "movement": 2, "is_sub": true },
        { "name": "destroyer", "category": "sea", "cost": 8, "attack": 2, "defense": 2, "movement": 2 },
        { "name": "factory", "category": "factory", "cost": 15 }
    ],
    "territories": [
        { "name": "Berlin", "kind": "land", "production": 10, "owner": "Germany" },
        { "name": "Western Germany", "kind": "land", "production": 5, "owner": "Germany" },
        { "name": "Poland", "kind": "land", "production": 3, "owner": "Germany" },
        { "name": "Ukraine", "kind": "land", "production": 4, "owner": "Germany" },
        { "name": "Moscow", "kind": "land", "production": 8, "owner": "Russia" },
        { "name": "Karelia", "kind": "land", "production": 2, "owner": "Russia" },
        { "name": "London", "kind": "land", "production": 8, "owner": "Britain" },
        { "name": "Baltic", "kind": "sea" },
        { "name": "North Sea", "kind": "sea" }
    ],
    "connections": [
        ["Berlin", "Western Germany"], ["Berlin", "Poland"], ["Poland", "Ukraine"], ["Ukraine", "Moscow"],
        ["Poland", "Karelia"], ["Moscow", "Karelia"], ["Berlin", "Baltic"], ["Poland", "Baltic"],
        ["Karelia", "Baltic"], ["Baltic", "North Sea"], ["Western Germany", "North Sea"], ["London", "North Sea"]
    ],
    "units": [
        { "territory": "Berlin", "unit": "factory", "owner": "Germany" },
        { "territory": "Berlin", "unit": "infantry", "owner": "Germany", "count": 4 },
        { "territory": "Western Germany", "unit": "factory", "owner": "Germany" },
        { "territory": "Western Germany", "unit": "infantry", "owner": "Germany", "count": 2 },
        { "territory": "Poland", "unit": "armour", "owner": "Germany", "count": 2 },
        { "territory": "Baltic", "unit": "destroyer", "owner": "Germany" },
        { "territory": "Moscow", "unit": "factory", "owner": "Russia" },
        { "territory": "Moscow", "unit": "infantry", "owner": "Russia", "count": 8 },
        { "territory": "Karelia", "unit": "armour", "owner": "Russia", "count": 3 },
        { "territory": "London", "unit": "factory", "owner": "Britain" },
        { "territory": "London", "unit": "fighter", "owner": "Britain", "count": 2 },
        { "territory": "North Sea", "unit": "destroyer", "owner": "Britain", "count": 2 },
        { "territory": "North Sea", "unit": "transport", "owner": "Britain" }
    ],
    "purchase": { "player": "Germany", "budget": 60 }
}"#;

fn bench_battle_estimate(c: &mut Criterion) {
    let scenario = parse_scenario(SCENARIO).unwrap();
    let board = &scenario.board;
    let combat = SimulatedCombat::new(board, 200, 1);
    let moscow = board.territory_by_name("Moscow").unwrap();
    let berlin = board.territory_by_name("Berlin").unwrap();
    let attackers = board.units(moscow).to_vec();
    let defenders = board.units(berlin).to_vec();
    c.bench_function("estimate_battle_200_trials", |b| {
        b.iter(|| combat.estimate_battle(black_box(scenario.player), berlin, black_box(&attackers), black_box(&defenders)))
    });
}

fn bench_threats(c: &mut Criterion) {
    let scenario = parse_scenario(SCENARIO).unwrap();
    let board = &scenario.board;
    let combat = SimulatedCombat::new(board, 200, 1);
    let owned = board.owned_land_territories(scenario.player);
    c.bench_function("max_enemy_attack_owned_land", |b| {
        b.iter(|| {
            for &t in &owned {
                black_box(combat.max_enemy_attack(scenario.player, t));
            }
        })
    });
}

fn bench_values(c: &mut Criterion) {
    let scenario = parse_scenario(SCENARIO).unwrap();
    let values = DistanceValueModel::new(&scenario.board);
    c.bench_function("territory_values", |b| {
        b.iter(|| values.territory_values(black_box(scenario.player), &[]))
    });
}

fn bench_plan_purchase(c: &mut Criterion) {
    let scenario = parse_scenario(SCENARIO).unwrap();
    let board = &scenario.board;
    let config = scenario.config.clone();

    let mut group = c.benchmark_group("plan_purchase");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));
    for trials in [50u32, 200] {
        let combat = SimulatedCombat::new(board, trials, config.seed);
        let values = DistanceValueModel::new(board);
        let deps = Collaborators { graph: board, combat: &combat, values: &values, costs: board };
        group.bench_function(format!("{trials}_trials"), |b| {
            b.iter(|| plan_purchase(scenario.player, black_box(scenario.budget), &scenario.options, &deps, &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_battle_estimate, bench_threats, bench_values, bench_plan_purchase);
criterion_main!(benches);
