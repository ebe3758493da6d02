use serde::Serialize;

use super::attributes::{Category, EngineClass, Transmission};
use super::quartile::Cohort;

/// Top-level block weights. Exact ninths: 0.4444 + 0.2222 + 3 x 0.1111.
pub const POLLUTANT_BLOCK: f64 = 4.0 / 9.0;
pub const ENERGY_BLOCK: f64 = 2.0 / 9.0;
pub const CATEGORY_BLOCK: f64 = 1.0 / 9.0;
pub const TRANSMISSION_BLOCK: f64 = 1.0 / 9.0;
pub const ENGINE_BLOCK: f64 = 1.0 / 9.0;

/// Share of the pollutant block given to each of CO, NOx, NMHC and CO2
pub const POLLUTANT_SHARE: f64 = 0.25;

pub const DEFAULT_PROFILE: u8 = 1;

/// The four pollutants scored by cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Co,
    Nox,
    Nmhc,
    Co2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [Pollutant::Co, Pollutant::Nox, Pollutant::Nmhc, Pollutant::Co2];
}

/// Within-block weights of one profile. Every block sums to 1 and is
/// scaled by its top-level block weight when looked up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileWeights {
    pub profile: u8,
    pub co: [f64; 4],
    pub nox: [f64; 4],
    pub nmhc: [f64; 4],
    pub co2: [f64; 4],
    pub energy: [f64; 4],
    pub category: [f64; 5],
    pub transmission: [f64; 3],
    pub engine: [f64; 4],
}

const PROFILE_1: ProfileWeights = ProfileWeights {
    profile: 1,
    co: [0.10, 0.20, 0.30, 0.40],
    nox: [0.10, 0.20, 0.30, 0.40],
    nmhc: [0.10, 0.20, 0.30, 0.40],
    co2: [0.10, 0.20, 0.30, 0.40],
    energy: [0.10, 0.20, 0.30, 0.40],
    category: [0.00, 0.25, 0.25, 0.25, 0.25],
    transmission: [0.25, 0.45, 0.30],
    engine: [0.10, 0.20, 0.30, 0.40],
};

const PROFILE_2: ProfileWeights = ProfileWeights {
    profile: 2,
    co: [0.10, 0.20, 0.30, 0.40],
    nox: [0.10, 0.20, 0.30, 0.40],
    nmhc: [0.10, 0.20, 0.30, 0.40],
    co2: [0.10, 0.20, 0.30, 0.40],
    energy: [0.10, 0.20, 0.30, 0.40],
    category: [0.25, 0.00, 0.25, 0.25, 0.25],
    transmission: [0.25, 0.45, 0.30],
    engine: [0.10, 0.20, 0.30, 0.40],
};

const PROFILE_3: ProfileWeights = ProfileWeights {
    profile: 3,
    co: [0.10, 0.20, 0.30, 0.40],
    nox: [0.10, 0.20, 0.30, 0.40],
    nmhc: [0.10, 0.20, 0.30, 0.40],
    co2: [0.10, 0.20, 0.30, 0.40],
    energy: [0.10, 0.20, 0.30, 0.40],
    category: [0.25, 0.25, 0.00, 0.25, 0.25],
    transmission: [0.25, 0.45, 0.30],
    engine: [0.10, 0.20, 0.30, 0.40],
};

const PROFILE_4: ProfileWeights = ProfileWeights {
    profile: 4,
    co: [0.10, 0.20, 0.30, 0.40],
    nox: [0.10, 0.20, 0.30, 0.40],
    nmhc: [0.10, 0.20, 0.30, 0.40],
    co2: [0.10, 0.20, 0.30, 0.40],
    energy: [0.10, 0.20, 0.30, 0.40],
    category: [0.25, 0.25, 0.25, 0.00, 0.25],
    transmission: [0.25, 0.45, 0.30],
    engine: [0.15, 0.20, 0.30, 0.35],
};

const PROFILE_5: ProfileWeights = ProfileWeights {
    profile: 5,
    co: [0.10, 0.20, 0.30, 0.40],
    nox: [0.10, 0.20, 0.30, 0.40],
    nmhc: [0.10, 0.20, 0.30, 0.40],
    co2: [0.10, 0.20, 0.30, 0.40],
    energy: [0.10, 0.20, 0.30, 0.40],
    category: [0.25, 0.25, 0.25, 0.25, 0.00],
    transmission: [0.25, 0.45, 0.30],
    engine: [0.15, 0.20, 0.30, 0.35],
};

pub const PROFILES: [ProfileWeights; 5] = [PROFILE_1, PROFILE_2, PROFILE_3, PROFILE_4, PROFILE_5];

/// Weight table for `profile`. Anything outside 1..=5 gets profile 1.
pub fn weights(profile: i64) -> &'static ProfileWeights {
    match profile {
        1..=5 => &PROFILES[(profile - 1) as usize],
        _ => &PROFILES[(DEFAULT_PROFILE - 1) as usize],
    }
}

impl ProfileWeights {
    pub fn pollutant(&self, pollutant: Pollutant, cohort: Cohort) -> f64 {
        let block = match pollutant {
            Pollutant::Co => &self.co,
            Pollutant::Nox => &self.nox,
            Pollutant::Nmhc => &self.nmhc,
            Pollutant::Co2 => &self.co2,
        };
        POLLUTANT_BLOCK * POLLUTANT_SHARE * block[cohort.index()]
    }

    pub fn energy(&self, cohort: Cohort) -> f64 {
        ENERGY_BLOCK * self.energy[cohort.index()]
    }

    /// Unknown categories contribute nothing
    pub fn category(&self, category: Option<Category>) -> f64 {
        category.map_or(0.0, |c| CATEGORY_BLOCK * self.category[c.index()])
    }

    pub fn transmission(&self, transmission: Option<Transmission>) -> f64 {
        transmission.map_or(0.0, |t| TRANSMISSION_BLOCK * self.transmission[t.index()])
    }

    pub fn engine(&self, engine: Option<EngineClass>) -> f64 {
        engine.map_or(0.0, |e| ENGINE_BLOCK * self.engine[e.index()])
    }

    /// Named within-block weights, in a fixed order.
    pub fn blocks(&self) -> [(&'static str, &[f64]); 8] {
        [
            ("co", &self.co[..]),
            ("nox", &self.nox[..]),
            ("nmhc", &self.nmhc[..]),
            ("co2", &self.co2[..]),
            ("energy", &self.energy[..]),
            ("category", &self.category[..]),
            ("transmission", &self.transmission[..]),
            ("engine", &self.engine[..]),
        ]
    }

    /// The 32 effective weights (within-block weight x block weight),
    /// in `blocks()` order.
    pub fn composite(&self) -> Vec<f64> {
        self.blocks()
            .into_iter()
            .flat_map(|(name, block)| {
                let scale = block_scale(name);
                block.iter().map(move |w| w * scale)
            })
            .collect()
    }
}

/// Top-level scale applied to a named block
pub fn block_scale(name: &str) -> f64 {
    match name {
        "co" | "nox" | "nmhc" | "co2" => POLLUTANT_BLOCK * POLLUTANT_SHARE,
        "energy" => ENERGY_BLOCK,
        "category" => CATEGORY_BLOCK,
        "transmission" => TRANSMISSION_BLOCK,
        "engine" => ENGINE_BLOCK,
        _ => 0.0,
    }
}
