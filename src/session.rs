//! Explicit application session state.
//!
//! The selected consumer unit, the active pane and the report phase live in
//! one struct owned by the caller (CLI command, test, embedding app) instead
//! of a process-wide store. Router actions only take effect through
//! [`SessionState::apply`].

use serde::{Deserialize, Serialize};

use crate::issues::NavigationAction;
use crate::payload::RecommendationContract;
use crate::report::{ReportPhase, ReportViewModel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    #[default]
    Dashboard,
    Invoices,
    Tariffs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceFilter {
    #[default]
    All,
    Pending,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub selected_consumer_unit: Option<u64>,
    pub active_pane: Pane,
    pub invoice_filter: InvoiceFilter,
    /// Subgroup preset when navigating to the tariffs pane.
    pub active_subgroup: Option<String>,
    pub analysis_open: bool,
    pub phase: ReportPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            selected_consumer_unit: None,
            active_pane: Pane::default(),
            invoice_filter: InvoiceFilter::default(),
            active_subgroup: None,
            analysis_open: false,
            phase: ReportPhase::Loading,
        }
    }

    /// Selecting a consumer unit resets the whole flow back to `Loading`.
    pub fn select_consumer_unit(&mut self, consumer_unit: u64) {
        *self = Self {
            selected_consumer_unit: Some(consumer_unit),
            ..Self::new()
        };
    }

    pub fn mark_ready(&mut self, report: ReportViewModel) {
        self.phase = ReportPhase::Ready(Box::new(report));
    }

    pub fn mark_fetch_failed(&mut self, reason: impl Into<String>) {
        self.phase = ReportPhase::FetchFailed {
            reason: reason.into(),
        };
    }

    /// Executes a routed navigation action. The tariff preset comes from the
    /// current contract, per the routing table.
    pub fn apply(&mut self, action: NavigationAction, current_contract: &RecommendationContract) {
        match action {
            NavigationAction::TariffsPage => {
                self.active_pane = Pane::Tariffs;
                self.active_subgroup = Some(current_contract.subgroup.clone());
            }
            NavigationAction::PendingInvoices => {
                self.active_pane = Pane::Invoices;
                self.invoice_filter = InvoiceFilter::Pending;
            }
        }
    }

    /// Opens the detailed-analysis drawer; refused below the minimum bill
    /// count.
    pub fn open_analysis(&mut self, report: &ReportViewModel) -> bool {
        self.analysis_open = report.has_minimum_energy_bills;
        self.analysis_open
    }
}
