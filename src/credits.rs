//! Credit counters and plan tiers
//!
//! Each plan grants a fixed allotment of page and idea credits when it is
//! selected. Credits are spent one at a time after a successful generation and
//! are never topped up except by selecting a plan again.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Basic,
    Pro,
    Business,
}

/// The two independent kinds of generation a credit can pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    Page,
    Idea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allotment {
    pub page_credits: u32,
    pub idea_credits: u32,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Plan::Free, Plan::Basic, Plan::Pro, Plan::Business];

    pub const fn allotment(self) -> Allotment {
        match self {
            Plan::Free => Allotment {
                page_credits: 2,
                idea_credits: 2,
            },
            Plan::Basic => Allotment {
                page_credits: 30,
                idea_credits: 0,
            },
            Plan::Pro => Allotment {
                page_credits: 50,
                idea_credits: 20,
            },
            Plan::Business => Allotment {
                page_credits: 80,
                idea_credits: 40,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Business => "business",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "basic" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            "business" => Ok(Plan::Business),
            other => Err(Error::Validation(format!(
                "Unknown plan '{}'. Expected one of: free, basic, pro, business",
                other
            ))),
        }
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditKind::Page => f.write_str("page generation"),
            CreditKind::Idea => f.write_str("idea generation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditState {
    plan: Plan,
    page_credits: u32,
    idea_credits: u32,
}

impl Default for CreditState {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditState {
    /// Session start: free plan with its starting allowance.
    pub fn new() -> Self {
        Self::for_plan(Plan::Free)
    }

    pub fn for_plan(plan: Plan) -> Self {
        let allotment = plan.allotment();
        Self {
            plan,
            page_credits: allotment.page_credits,
            idea_credits: allotment.idea_credits,
        }
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn page_credits(&self) -> u32 {
        self.page_credits
    }

    pub fn idea_credits(&self) -> u32 {
        self.idea_credits
    }

    pub fn remaining(&self, kind: CreditKind) -> u32 {
        match kind {
            CreditKind::Page => self.page_credits,
            CreditKind::Idea => self.idea_credits,
        }
    }

    pub fn can_spend(&self, kind: CreditKind) -> bool {
        self.remaining(kind) > 0
    }

    /// Switch plans. Both counters are replaced with the new plan's
    /// allotment; unused credits from the previous plan are discarded.
    pub fn select_plan(&mut self, plan: Plan) {
        *self = Self::for_plan(plan);
    }

    /// Spend one credit of `kind`.
    pub fn consume(&mut self, kind: CreditKind) -> Result<()> {
        let counter = match kind {
            CreditKind::Page => &mut self.page_credits,
            CreditKind::Idea => &mut self.idea_credits,
        };
        *counter = counter
            .checked_sub(1)
            .ok_or(Error::CreditsExhausted(kind))?;
        Ok(())
    }
}
