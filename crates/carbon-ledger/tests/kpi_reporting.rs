use carbon_ledger::accounting::kpi::InsightKind;
use carbon_ledger::accounting::ledger::capture::{
    CommuteFlow, Consumable, HeatedSurface, HeatingSource, TravelMode, TravellerProfile,
};
use carbon_ledger::accounting::{
    classify_scope, compute_kpis, report_snapshot, AmbitionLevel, CarbonSession, EntryDraft,
    Ledger, Population, ProjectSettings, Scope,
};
use chrono::NaiveDate;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
}

fn school_session() -> CarbonSession {
    let settings = ProjectSettings {
        entity_name: "Lycée des Métiers".to_string(),
        population: Population {
            students: 80,
            apprentices: 15,
            staff: 5,
        },
        operating_days: 180,
        ..ProjectSettings::default()
    };
    let mut session = CarbonSession::new(Default::default(), settings);

    let factors = session.factors().clone();
    let drafts = vec![
        CommuteFlow {
            profile: TravellerProfile::FullTimeStudent,
            mode: TravelMode::CarThermal,
            round_trip_km: 24.0,
            travellers: 20,
            uncertainty_pct: 10,
        }
        .draft(&factors, session.settings())
        .expect("commute draft"),
        HeatedSurface {
            surface_m2: 1200.0,
            source: HeatingSource::Gas,
            kwh_per_m2_year: 110.0,
        }
        .draft(&factors)
        .expect("heating draft"),
        Consumable::BeefMeal
            .draft(2000.0, &factors)
            .expect("meal draft")
            .with_uncertainty(20),
        EntryDraft::new("Energy", "Elec consumption", 45_000.0, "kWh", 0.06).with_detail("Scope 2"),
    ];
    session.record_drafts(drafts, day()).expect("valid drafts");
    session
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

#[test]
fn kpis_follow_the_ledger_totals() {
    let session = school_session();
    let kpis = session.kpis();
    let total = session.ledger().total_impact_kgco2();

    assert_eq!(kpis.entry_count, 4);
    assert_eq!(kpis.population, 100);
    assert!(close(kpis.total_kgco2, total));
    assert!(close(kpis.per_capita_t, total / 1000.0 / 100.0));
    assert!(close(kpis.shadow_cost_eur, total / 1000.0 * 100.0));
    assert!(close(kpis.daily_intensity_kg, total / 180.0));
    assert!(close(kpis.band_high_kgco2 - kpis.band_low_kgco2, 2.0 * kpis.total_margin_kgco2));
    assert!((0.0..=10.0).contains(&kpis.data_quality_index));
    assert_eq!(kpis.ambition, AmbitionLevel::GlobalTransition);
}

#[test]
fn kpis_are_idempotent() {
    let session = school_session();
    assert_eq!(session.kpis(), session.kpis());
    assert_eq!(session.report(), session.report());
}

#[test]
fn empty_ledger_never_divides_by_zero() {
    let settings = ProjectSettings {
        population: Population {
            students: 0,
            apprentices: 0,
            staff: 0,
        },
        operating_days: 0,
        ..ProjectSettings::default()
    };
    let kpis = compute_kpis(&Ledger::new(), &settings);

    assert_eq!(kpis.total_kgco2, 0.0);
    assert_eq!(kpis.per_capita_t, 0.0);
    assert_eq!(kpis.daily_intensity_kg, 0.0);
    assert_eq!(kpis.scope3_share_pct, 0.0);
    assert_eq!(kpis.data_quality_index, 0.0);
    assert!(kpis.on_target);

    let report = report_snapshot(&Ledger::new(), &settings);
    assert!(report.insights.is_empty());
    assert_eq!(report.scopes.rows.len(), 3);
}

#[test]
fn scopes_partition_the_ledger() {
    let session = school_session();
    let ledger = session.ledger();
    let report = session.report();

    let entries: usize = report.scopes.rows.iter().map(|row| row.entries).sum();
    let impact_t: f64 = report.scopes.rows.iter().map(|row| row.impact_t).sum();
    assert_eq!(entries, ledger.len());
    assert!(close(impact_t, ledger.total_impact_kgco2() / 1000.0));

    let scope1 = report.scopes.get(Scope::Scope1).expect("scope 1 row");
    assert_eq!(scope1.entries, 1);
    let scope2 = report.scopes.get(Scope::Scope2).expect("scope 2 row");
    assert_eq!(scope2.entries, 1);

    for entry in ledger {
        assert_eq!(classify_scope(entry), classify_scope(entry));
    }
}

#[test]
fn report_orders_emitters_and_flags_the_dominant_category() {
    let report = school_session().report();

    assert_eq!(report.entity_name, "Lycée des Métiers");
    assert!(report.top_emitters.len() <= 5);
    let impacts: Vec<f64> = report
        .top_emitters
        .iter()
        .map(|emitter| emitter.impact_kgco2)
        .collect();
    assert!(impacts.windows(2).all(|pair| pair[0] >= pair[1]));

    let dominant = report
        .insights
        .iter()
        .find(|insight| insight.kind == InsightKind::DominantCategory)
        .expect("dominant category insight");
    assert!(dominant.message.contains(&report.categories[0].category));
}
