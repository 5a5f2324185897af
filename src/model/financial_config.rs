use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Financial settings attached to one quote (at most one per quote).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialConfig {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub settings: FinancialSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancialSettings {
    #[serde(default)]
    pub vat: VatSettings,
    #[serde(default)]
    pub deposit: DepositSettings,
    #[serde(default)]
    pub discount: DiscountSettings,
    #[serde(default)]
    pub banner: BannerSettings,
    pub default_conditions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AmountMode {
    #[default]
    Fixed,
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Percentage, e.g. 21 for 21 %
    #[serde(default)]
    pub rate: Decimal,
    /// Show the VAT lines on the client document
    #[serde(default = "default_true")]
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DepositSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: AmountMode,
    #[serde(default)]
    pub value: Decimal,
}

/// Conditional offer shown to the client, e.g. "5 % off if signed this week".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiscountSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: AmountMode,
    #[serde(default)]
    pub value: Decimal,
    pub label: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BannerSettings {
    #[serde(default)]
    pub enabled: bool,
    pub text: Option<String>,
}

impl Default for VatSettings {
    fn default() -> Self {
        VatSettings {
            enabled: false,
            rate: Decimal::ZERO,
            display: true,
        }
    }
}

fn default_true() -> bool {
    true
}
