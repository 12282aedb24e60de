//! Alias Registry - human-readable measurement names
//!
//! Maps readable sensor names (e.g. `Fan_inlet_temperature_T2`) to the
//! canonical feature identifiers the model was trained on (`s1`), and back.

use std::collections::HashMap;

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

/// C-MAPSS turbofan channels: readable name -> canonical identifier
pub const CMAPSS_ALIASES: &[(&str, &str)] = &[
    // === Operational settings ===
    ("Altitude_factor", "op_setting1"),
    ("Throttle_resolver_angle", "op_setting2"),
    ("Mach_temperature_index", "op_setting3"),

    // === Sensors ===
    ("Fan_inlet_temperature_T2", "s1"),
    ("LPC_outlet_temperature_T24", "s2"),
    ("HPC_outlet_temperature_T30", "s3"),
    ("LPT_outlet_temperature_T50", "s4"),
    ("Fan_inlet_pressure_P2", "s5"),
    ("LPC_outlet_pressure_P15", "s6"),
    ("HPC_outlet_pressure_P30", "s7"),
    ("Physical_fan_speed_Nf", "s8"),
    ("Physical_core_speed_Nc", "s9"),
    ("Engine_pressure_ratio_EPR", "s10"),
    ("Bypass_duct_exit_pressure_Ps30", "s11"),
    ("Fuel_flow_ratio_to_Ps30", "s12"),
    ("Corrected_fan_speed_Wf", "s13"),
    ("Corrected_core_speed", "s14"),
    ("Bypass_ratio_BPR", "s15"),
    ("Burner_fuel_air_ratio_FARB", "s16"),
    ("Bleed_enthalpy", "s17"),
    ("Demanded_fan_speed", "s18"),
    ("Demanded_corrected_fan_speed", "s19"),
    ("HPT_coolant_bleed", "s20"),
    ("LPT_coolant_bleed", "s21"),
];

// ============================================================================
// REGISTRY
// ============================================================================

/// Bidirectional alias table, immutable after construction
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    to_canonical: HashMap<String, String>,
    /// Aliases per canonical id, in table insertion order
    to_aliases: HashMap<String, Vec<String>>,
}

impl AliasRegistry {
    /// Build from `(alias, canonical)` pairs. A repeated alias keeps its
    /// first mapping so both directions stay consistent.
    pub fn new<A, C>(pairs: impl IntoIterator<Item = (A, C)>) -> Self
    where
        A: Into<String>,
        C: Into<String>,
    {
        let mut registry = Self::default();

        for (alias, canonical) in pairs {
            let alias = alias.into();
            if registry.to_canonical.contains_key(&alias) {
                tracing::warn!("Duplicate alias '{}' ignored", alias);
                continue;
            }
            let canonical = canonical.into();
            registry
                .to_aliases
                .entry(canonical.clone())
                .or_default()
                .push(alias.clone());
            registry.to_canonical.insert(alias, canonical);
        }

        registry
    }

    /// The built-in turbofan table
    pub fn cmapss() -> Self {
        Self::new(CMAPSS_ALIASES.iter().copied())
    }

    pub fn canonical_for(&self, name: &str) -> Option<&str> {
        self.to_canonical.get(name).map(String::as_str)
    }

    /// Aliases of `id` in registry order; empty when it has none
    pub fn aliases_for(&self, id: &str) -> &[String] {
        self.to_aliases.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_canonical.is_empty()
    }
}
