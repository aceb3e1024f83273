use crate::accounting::factors::{keys as factor_keys, GridMix};
use crate::accounting::normalizer::normalize_text;
use crate::accounting::settings::keys as setting_keys;
use std::collections::HashMap;
use std::sync::OnceLock;

static LEGACY_PARAM_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Current key for a params entry, and whether it was renamed.
pub(crate) fn canonical_param_key(raw: &str) -> (&str, bool) {
    match legacy_param_map().get(raw.trim()) {
        Some(current) => (*current, true),
        None => (raw.trim(), false),
    }
}

/// True for keys that older backups used and that load renames to a current key.
pub(crate) fn is_legacy_param_key(raw: &str) -> bool {
    legacy_param_map().contains_key(raw.trim())
}

fn legacy_param_map() -> &'static HashMap<&'static str, &'static str> {
    LEGACY_PARAM_MAP.get_or_init(|| {
        const LEGACY_TO_CURRENT: &[(&str, &str)] = &[
            // Settings
            ("pop_etu", setting_keys::POP_STUDENTS),
            ("pop_alt", setting_keys::POP_APPRENTICES),
            ("pop_prof", setting_keys::POP_STAFF),
            ("jours_ouverture", setting_keys::OPERATING_DAYS),
            ("country_choice", setting_keys::GRID),
            // Energy & water
            ("fe_elec", factor_keys::ELECTRICITY),
            ("fe_gaz", factor_keys::GAS),
            ("fe_eau", factor_keys::WATER),
            ("fe_dechet", factor_keys::WASTE),
            // Mobility
            ("fe_voit", factor_keys::CAR_THERMAL),
            ("fe_voit_elec", factor_keys::CAR_ELECTRIC),
            ("fe_avion_court", factor_keys::PLANE_SHORT),
            ("fe_avion_long", factor_keys::PLANE_LONG),
            ("fe_tgv", factor_keys::TGV),
            ("fe_ter", factor_keys::REGIONAL_TRAIN),
            ("fe_bus", factor_keys::BUS),
            ("fe_autocar", factor_keys::COACH),
            // Food & purchases
            ("fe_boeuf", factor_keys::BEEF_MEAL),
            ("fe_volaille", factor_keys::POULTRY_MEAL),
            ("fe_vege", factor_keys::VEGETARIAN_MEAL),
            ("fe_cafe", factor_keys::COFFEE),
            // IT
            ("fe_it_laptop", factor_keys::LAPTOP_MANUFACTURING),
            ("fe_it_desktop", factor_keys::DESKTOP_MANUFACTURING),
            ("fe_it_screen", factor_keys::SCREEN_MANUFACTURING),
            ("fe_it_smartphone", factor_keys::SMARTPHONE_MANUFACTURING),
        ];

        LEGACY_TO_CURRENT.iter().copied().collect()
    })
}

/// Resolves grid presets, including the localised country labels of older backups.
pub(crate) fn grid_for_label(raw: &str) -> Option<GridMix> {
    if let Some(grid) = GridMix::from_key(raw) {
        return Some(grid);
    }

    const LEGACY_COUNTRY_PREFIXES: &[(&str, GridMix)] = &[
        ("allemagne", GridMix::Germany),
        ("europe", GridMix::EuropeAverage),
        ("chine", GridMix::China),
        ("états-unis", GridMix::Usa),
    ];

    let normalized = normalize_text(raw);
    LEGACY_COUNTRY_PREFIXES
        .iter()
        .find(|(prefix, _)| normalized.starts_with(prefix))
        .map(|(_, grid)| *grid)
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(raw: &str) -> Option<&'static str> {
    legacy_param_map().get(raw).copied()
}
