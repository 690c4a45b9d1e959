//! Indicator catalog: what a run fetches, what it derives, and how each indicator is
//! labeled in the output.
//!
//! Display names are used while the dataset is assembled; [`Catalog::rename`] swaps
//! them for slugs at the end, and the threshold table is keyed by slug.

use super::types::{Frequency, LabeledObservation};

/// Where a fetched indicator comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Fred {
        series_id: &'static str,
    },
    Eurostat {
        dataset: &'static str,
        filters: &'static [(&'static str, &'static str)],
    },
    Ecb {
        dataflow: &'static str,
        series_key: &'static str,
    },
}

impl Provider {
    pub fn describe(&self) -> String {
        match self {
            Provider::Fred { series_id } => format!("FRED {series_id}"),
            Provider::Eurostat { dataset, .. } => format!("Eurostat {dataset}"),
            Provider::Ecb {
                dataflow,
                series_key,
            } => format!("ECB {dataflow}/{series_key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Backward as-of carry-forward onto month starts, from the run's start date.
    MonthlyResample,
    /// Month-over-month percentage change.
    MonthlyChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Fetched(Provider),
    Derived {
        /// Display name of the base indicator.
        base: &'static str,
        derivation: Derivation,
    },
    /// Supplied out of band (stock sheet export).
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub slug: &'static str,
    pub source: &'static str,
    pub unit: &'static str,
    pub frequency: Frequency,
    pub origin: Origin,
}

impl IndicatorSpec {
    /// Relabel a value of this indicator.
    pub fn label(&self, date: chrono::NaiveDate, value: f64) -> LabeledObservation {
        LabeledObservation {
            date,
            value,
            indicator: self.name.to_string(),
            source: self.source.to_string(),
            unit: self.unit.to_string(),
        }
    }
}

pub const STOCK_INDEX: IndicatorSpec = IndicatorSpec {
    name: "OMX Stockholm All-Share Index",
    slug: "omx_smi",
    source: "google spreadsheet",
    unit: "Index points",
    frequency: Frequency::Daily,
    origin: Origin::Imported,
};

const STANDARD: [IndicatorSpec; 8] = [
    IndicatorSpec {
        name: "Eurozone HICP (Monthly Rate of Change)",
        slug: "inflation_monthly_euro",
        source: "Eurostat",
        unit: "Percent",
        frequency: Frequency::Monthly,
        origin: Origin::Fetched(Provider::Eurostat {
            dataset: "prc_hicp_mmor",
            filters: &[("geo", "EU27_2020"), ("coicop", "CP00")],
        }),
    },
    IndicatorSpec {
        name: "Eurozone Unemployment Rate",
        slug: "unemployment_rate_monthly_euro",
        source: "Eurostat",
        unit: "Percent",
        frequency: Frequency::Monthly,
        origin: Origin::Fetched(Provider::Eurostat {
            dataset: "ei_lmhr_m",
            filters: &[("geo", "EU27_2020"), ("s_adj", "SA"), ("indic", "LM-UN-T-TOT")],
        }),
    },
    IndicatorSpec {
        name: "Eurozone Interest Rate (Main Refinancing Operations)",
        slug: "interest_rate_change_day_euro",
        source: "ECB",
        unit: "Percent per annum",
        frequency: Frequency::Daily,
        origin: Origin::Fetched(Provider::Ecb {
            dataflow: "FM",
            series_key: "B.U2.EUR.4F.KR.MRR_FR.LEV",
        }),
    },
    IndicatorSpec {
        name: "Eurozone Monthly Interest Rate (Main Refinancing Operations)",
        slug: "interest_rate_monthly_euro",
        source: "ECB",
        unit: "Percent per annum",
        frequency: Frequency::Monthly,
        origin: Origin::Derived {
            base: "Eurozone Interest Rate (Main Refinancing Operations)",
            derivation: Derivation::MonthlyResample,
        },
    },
    IndicatorSpec {
        name: "US Unemployment Rate",
        slug: "unemployment_monthly_rate_us",
        source: "FRED",
        unit: "Percent",
        frequency: Frequency::Monthly,
        origin: Origin::Fetched(Provider::Fred { series_id: "UNRATE" }),
    },
    IndicatorSpec {
        name: "US CPI",
        slug: "inflation_index_monthly_us",
        source: "FRED",
        unit: "Index",
        frequency: Frequency::Monthly,
        origin: Origin::Fetched(Provider::Fred {
            series_id: "CPIAUCSL",
        }),
    },
    IndicatorSpec {
        name: "US CPI (Monthly Rate of Change)",
        slug: "inflation_monthly_us",
        source: "FRED",
        unit: "Percent",
        frequency: Frequency::Monthly,
        origin: Origin::Derived {
            base: "US CPI",
            derivation: Derivation::MonthlyChange,
        },
    },
    IndicatorSpec {
        name: "US Federal Funds Rate",
        slug: "interest_rate_monthly_us",
        source: "FRED",
        unit: "Percent",
        frequency: Frequency::Monthly,
        origin: Origin::Fetched(Provider::Fred { series_id: "DFF" }),
    },
];

#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<IndicatorSpec>,
}

impl Catalog {
    pub fn new(specs: Vec<IndicatorSpec>) -> Self {
        Self { specs }
    }

    /// The indicators the production run tracks.
    pub fn standard() -> Self {
        Self::new(STANDARD.to_vec())
    }

    pub fn specs(&self) -> &[IndicatorSpec] {
        &self.specs
    }

    pub fn fetched(&self) -> impl Iterator<Item = (&IndicatorSpec, Provider)> {
        self.specs.iter().filter_map(|spec| match spec.origin {
            Origin::Fetched(provider) => Some((spec, provider)),
            _ => None,
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&IndicatorSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Look up an indicator by slug, the stock index included.
    pub fn by_slug(&self, slug: &str) -> Option<&IndicatorSpec> {
        if slug == STOCK_INDEX.slug {
            return Some(&STOCK_INDEX);
        }
        self.specs.iter().find(|spec| spec.slug == slug)
    }

    pub fn slug_for(&self, name: &str) -> Option<&'static str> {
        if name == STOCK_INDEX.name {
            return Some(STOCK_INDEX.slug);
        }
        self.by_name(name).map(|spec| spec.slug)
    }

    /// Replace display names with slugs; names not in the catalog pass through.
    pub fn rename(&self, rows: Vec<LabeledObservation>) -> Vec<LabeledObservation> {
        rows.into_iter()
            .map(|mut row| {
                if let Some(slug) = self.slug_for(&row.indicator) {
                    row.indicator = slug.to_string();
                }
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn standard_catalog_slugs_are_unique() {
        let catalog = Catalog::standard();
        let mut slugs: Vec<_> = catalog.specs().iter().map(|s| s.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), catalog.specs().len());
    }

    #[test]
    fn derived_indicators_reference_fetched_bases() {
        let catalog = Catalog::standard();
        for spec in catalog.specs() {
            if let Origin::Derived { base, .. } = spec.origin {
                let base = catalog.by_name(base).expect("base present");
                assert!(matches!(base.origin, Origin::Fetched(_)));
            }
        }
    }

    #[test]
    fn slugs_resolve_to_their_frequency() {
        let catalog = Catalog::standard();
        let daily = catalog.by_slug("interest_rate_change_day_euro").expect("ECB rate");
        assert_eq!(daily.frequency, Frequency::Daily);
        assert_eq!(catalog.by_slug("omx_smi").map(|s| s.frequency), Some(Frequency::Daily));
        assert_eq!(catalog.by_slug("inflation_monthly_us").map(|s| s.frequency), Some(Frequency::Monthly));
        assert!(catalog.by_slug("gdp_quarterly").is_none());
    }

    #[test]
    fn rename_maps_known_names_and_keeps_unknown() {
        let catalog = Catalog::standard();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let us_cpi = catalog.by_name("US CPI").unwrap().label(date, 310.0);
        let mut other = us_cpi.clone();
        other.indicator = "Something Else".to_string();

        let renamed = catalog.rename(vec![us_cpi, other]);
        assert_eq!(renamed[0].indicator, "inflation_index_monthly_us");
        assert_eq!(renamed[1].indicator, "Something Else");
    }

    #[test]
    fn stock_index_is_renamed_without_being_in_the_catalog() {
        let catalog = Catalog::new(Vec::new());
        assert_eq!(catalog.slug_for(STOCK_INDEX.name), Some("omx_smi"));
    }
}
