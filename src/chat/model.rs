//! Tier-based model selection
//!
//! Maps the client's requested tier onto a concrete Gemini model id and
//! decides whether the search grounding tool is attached.

use serde::{Deserialize, Serialize};

/// Default premium model
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";
/// Default standard model
pub const DEFAULT_SMART_MODEL: &str = "gemini-2.5-flash";
/// Default search-capable model
pub const DEFAULT_INTERNET_MODEL: &str = "gemini-1.5-flash";

/// Requested model tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Premium model, highest quality
    Pro,
    /// Standard model
    #[default]
    Smart,
    /// Legacy model that supports search grounding
    Internet,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Pro => write!(f, "pro"),
            Tier::Smart => write!(f, "smart"),
            Tier::Internet => write!(f, "internet"),
        }
    }
}

impl Tier {
    /// Resolve a client-supplied `aiModel` label.
    ///
    /// Unknown labels and a missing label fall back to [`Tier::Smart`].
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("pro") => Tier::Pro,
            Some("internet") => Tier::Internet,
            _ => Tier::Smart,
        }
    }

    /// Whether this tier may carry the search grounding tool.
    pub fn supports_grounding(&self) -> bool {
        matches!(self, Tier::Internet)
    }

    /// Remediation hint returned with upstream failures for this tier.
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            Tier::Pro => {
                "The pro model has tighter quotas. Retry shortly or switch to the smart model."
            }
            Tier::Smart => {
                "Retry the request. If the problem persists, check the provider status and the server API key."
            }
            Tier::Internet => {
                "Web search grounding may be unavailable for this key or model. Retry with useGrounding disabled or use the smart model."
            }
        }
    }
}

/// Concrete model ids per tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub pro: String,
    pub smart: String,
    pub internet: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            pro: DEFAULT_PRO_MODEL.to_string(),
            smart: DEFAULT_SMART_MODEL.to_string(),
            internet: DEFAULT_INTERNET_MODEL.to_string(),
        }
    }
}

/// Outcome of model selection for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub tier: Tier,
    pub model_id: String,
    /// Attach the search grounding tool
    pub grounding: bool,
}

impl ModelCatalog {
    /// Model id configured for a tier
    pub fn model_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Pro => &self.pro,
            Tier::Smart => &self.smart,
            Tier::Internet => &self.internet,
        }
    }

    /// Select the model and tool configuration for a request.
    ///
    /// Grounding is only ever enabled for the internet tier, and only when
    /// the client asked for it.
    pub fn select(&self, tier: Tier, use_grounding: bool) -> ModelSelection {
        ModelSelection {
            tier,
            model_id: self.model_for(tier).to_string(),
            grounding: tier.supports_grounding() && use_grounding,
        }
    }
}
