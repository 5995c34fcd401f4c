//! Data model for the additive-duty schedule builder.

pub mod code;
pub mod country;
pub mod duty;
pub mod error;
pub mod list;
pub mod rule;
pub mod tariff;

pub use code::{CODE_WIDTH, HtsCode, digits_only};
pub use country::{
    COLUMN2_COUNTRIES, CountryProgram, NTR_SUSPENDED_COUNTRIES, country_programs,
};
pub use duty::{CountryScope, DutyInstance, DutyKind, ProductType, format_percent};
pub use error::{ModelError, Result};
pub use list::{ListEntry, Section301List, controlling_entries};
pub use rule::{Applicability, DutyRule, ReducedRate, RuleStatus};
pub use tariff::{
    AvailableProgram, BaseTariffEntry, Chapter99Type, FtaProgram, ProgramColumns, ProgramRates,
    ResolvedEntry, TariffRow,
};
