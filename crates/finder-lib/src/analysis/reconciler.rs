//! Reservation versus deployment reconciliation

use tracing::{debug, info};

use super::ACTIVE_STATE;
use crate::error::FinderError;
use crate::inventory::{NodeTypeFilter, ReservationInventory};
use crate::models::{NodeCounts, ReservedNode, SummaryRow};
use crate::notify::RunAlerts;

/// Output of a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Summary rows in node type first-seen order
    pub rows: Vec<SummaryRow>,
    /// Reservations returned by the inventory, counted or not
    pub scanned: usize,
    /// Reservations added to the counters
    pub matched: usize,
    /// Pages fetched
    pub pages: usize,
}

impl Reconciliation {
    pub fn under_reserved(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|r| r.diff > 0)
    }
}

/// Adds active reservations to the deployed counters
#[derive(Debug, Clone)]
pub struct ReservationReconciler {
    filter: NodeTypeFilter,
}

impl ReservationReconciler {
    pub fn new(filter: NodeTypeFilter) -> Self {
        Self { filter }
    }

    /// True when the reservation counts toward the summary
    pub fn includes(&self, reservation: &ReservedNode) -> bool {
        self.filter.matches(&reservation.node_type) && reservation.state == ACTIVE_STATE
    }

    /// Walk every reservation page, update `counts`, and derive the gaps.
    ///
    /// A positive gap on any node type triggers the reservation findings
    /// alert.
    pub async fn reconcile(
        &self,
        inventory: &dyn ReservationInventory,
        counts: &mut NodeCounts,
        alerts: &mut RunAlerts<'_>,
    ) -> Result<Reconciliation, FinderError> {
        let mut result = Reconciliation::default();
        let mut cursor = None;

        loop {
            let page = inventory.list_reservations(cursor.take()).await?;
            result.pages += 1;
            result.scanned += page.items.len();
            debug!(
                event = "page_fetched",
                resource = "reservations",
                page = result.pages,
                items = page.items.len(),
                "Fetched reservation page"
            );

            for reservation in page.items.iter().filter(|r| self.includes(r)) {
                counts.record_reserved(&reservation.node_type, reservation.node_count);
                result.matched += 1;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        result.rows = counts.summary_rows();

        for row in result.rows.iter().filter(|r| r.diff > 0) {
            info!(
                event = "reservation_gap",
                node_type = %row.node_type,
                deployed = row.deployed,
                reserved = row.reserved,
                gap = row.diff,
                "Node type is under-reserved"
            );
        }
        if result.under_reserved().next().is_some() {
            alerts.reservation_gap_found().await?;
        }

        Ok(result)
    }
}
