//! Routing for the payload's business-issue entries.
//!
//! `errors` and `warnings` are data, not exceptions: each carries a numeric
//! code the UI maps to a navigation affordance ("fix this by going there").
//! Unknown codes degrade to display-only and never fail.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// One entry of the payload's `errors` / `warnings` arrays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl Display for IssueSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Error => "Erro",
            Self::Warning => "Aviso",
        };
        write!(f, "{display}")
    }
}

/// Known issue codes as agreed with the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    TariffsNotFound,
    NotEnoughEnergyBills,
    NotEnoughEnergyBillsWithAtypical,
    PendingBills,
    ExpiredTariff,
}

impl IssueCode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::TariffsNotFound),
            2 => Some(Self::NotEnoughEnergyBills),
            3 => Some(Self::NotEnoughEnergyBillsWithAtypical),
            4 => Some(Self::PendingBills),
            5 => Some(Self::ExpiredTariff),
            _ => None,
        }
    }
}

/// Where the caller should send the user for a given issue. Dispatching the
/// navigation itself is the caller's job ([`crate::session::SessionState`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    /// Distributor's tariff pane, active subgroup preset from the current
    /// contract.
    TariffsPage,
    /// Invoices pane filtered down to pending entries.
    PendingInvoices,
}

impl Display for NavigationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::TariffsPage => "Tarifas da distribuidora",
            Self::PendingInvoices => "Faturas pendentes",
        };
        write!(f, "{display}")
    }
}

/// Maps an issue code to its navigation action. Unknown codes return `None`:
/// the message is still shown, it just leads nowhere.
pub fn route_issue(code: i64) -> Option<NavigationAction> {
    let known = IssueCode::from_code(code)?;
    let action = match known {
        IssueCode::TariffsNotFound | IssueCode::ExpiredTariff => NavigationAction::TariffsPage,
        IssueCode::NotEnoughEnergyBills
        | IssueCode::NotEnoughEnergyBillsWithAtypical
        | IssueCode::PendingBills => NavigationAction::PendingInvoices,
    };
    Some(action)
}

/// An issue joined with its severity and routed destination, ready to
/// render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutedIssue {
    pub severity: IssueSeverity,
    pub code: i64,
    pub message: String,
    pub action: Option<NavigationAction>,
}

pub fn route_issues(severity: IssueSeverity, issues: &[Issue]) -> Vec<RoutedIssue> {
    issues
        .iter()
        .map(|issue| RoutedIssue {
            severity,
            code: issue.code,
            message: issue.message.clone(),
            action: route_issue(issue.code),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{route_issue, route_issues, Issue, IssueSeverity, NavigationAction};

    #[test]
    fn routes_known_codes() {
        assert_eq!(route_issue(1), Some(NavigationAction::TariffsPage));
        assert_eq!(route_issue(2), Some(NavigationAction::PendingInvoices));
        assert_eq!(route_issue(3), Some(NavigationAction::PendingInvoices));
        assert_eq!(route_issue(4), Some(NavigationAction::PendingInvoices));
        assert_eq!(route_issue(5), Some(NavigationAction::TariffsPage));
    }

    #[test]
    fn unknown_codes_degrade_to_display_only() {
        assert_eq!(route_issue(0), None);
        assert_eq!(route_issue(99), None);
        assert_eq!(route_issue(-7), None);
    }

    #[test]
    fn routed_issues_keep_order_and_messages() {
        let issues = vec![
            Issue {
                code: 5,
                message: "Tarifa vencida".to_string(),
            },
            Issue {
                code: 42,
                message: "Aviso desconhecido".to_string(),
            },
        ];
        let routed = route_issues(IssueSeverity::Warning, &issues);
        assert_eq!(routed.len(), 2);
        assert_eq!(routed[0].action, Some(NavigationAction::TariffsPage));
        assert_eq!(routed[1].action, None);
        assert_eq!(routed[1].message, "Aviso desconhecido");
    }
}
