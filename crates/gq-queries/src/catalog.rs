//! Built-in grid specs
//!
//! One [`GridQuerySpec`] per endpoint. Grid ids come from configuration; the
//! attributes and base filters are fixed here.

use gq_core::config::GridIds;

use crate::builder::GridQuerySpec;
use crate::filters::{attributes, Condition};

/// Status value of active records
pub const ACTIVE: &str = "A";

/// The specs served by the HTTP layer
#[derive(Debug, Clone)]
pub struct GridCatalog {
    pub schedule: GridQuerySpec,
    pub ticket_items: GridQuerySpec,
    pub customer_jobs: GridQuerySpec,
    pub customer_invoices: GridQuerySpec,
    pub invoice_details: GridQuerySpec,
    pub customer_contacts: GridQuerySpec,
    pub drivers: GridQuerySpec,
}

impl GridCatalog {
    pub fn from_ids(ids: &GridIds) -> Self {
        Self {
            schedule: GridQuerySpec::date_range("schedule", ids.schedule, attributes::DATE),
            ticket_items: GridQuerySpec::identity(
                "ticket_items",
                ids.ticket_items,
                attributes::TICKET_ID,
            ),
            customer_jobs: GridQuerySpec::identity(
                "customer_jobs",
                ids.customer_jobs,
                attributes::CUSTOMER_ID,
            ),
            customer_invoices: GridQuerySpec::identity(
                "customer_invoices",
                ids.customer_invoices,
                attributes::CUSTOMER_ID,
            ),
            invoice_details: GridQuerySpec::identity(
                "invoice_details",
                ids.invoice_details,
                attributes::INVOICE_ID,
            ),
            customer_contacts: GridQuerySpec::identity(
                "customer_contacts",
                ids.customer_contacts,
                attributes::CUSTOMER_ID,
            ),
            drivers: GridQuerySpec::free_text_search("drivers", ids.drivers)
                .with_base(Condition::equals(attributes::STATUS, ACTIVE)),
        }
    }

    /// All specs, in endpoint order
    pub fn specs(&self) -> [&GridQuerySpec; 7] {
        [
            &self.schedule,
            &self.ticket_items,
            &self.customer_jobs,
            &self.customer_invoices,
            &self.invoice_details,
            &self.customer_contacts,
            &self.drivers,
        ]
    }

    /// Look a spec up by endpoint name
    pub fn by_name(&self, name: &str) -> Option<&GridQuerySpec> {
        self.specs().into_iter().find(|spec| spec.name == name)
    }
}

impl Default for GridCatalog {
    fn default() -> Self {
        Self::from_ids(&GridIds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConstructionRule;

    #[test]
    fn test_catalog_uses_configured_ids() {
        let ids = GridIds {
            customer_invoices: 41,
            ..GridIds::default()
        };
        let catalog = GridCatalog::from_ids(&ids);
        assert_eq!(catalog.customer_invoices.grid_id, 41);
        assert_eq!(catalog.drivers.grid_id, 34);
    }

    #[test]
    fn test_drivers_spec() {
        let catalog = GridCatalog::default();
        assert_eq!(catalog.drivers.rule, ConstructionRule::FreeTextSearch);
        assert_eq!(
            catalog.drivers.base_filter.conditions(),
            &[Condition::equals("Status", "A")]
        );
    }

    #[test]
    fn test_by_name() {
        let catalog = GridCatalog::default();
        let spec = catalog.by_name("invoice_details").unwrap();
        assert_eq!(
            spec.rule,
            ConstructionRule::IdentityLookup {
                attribute: "InvoiceID".into()
            }
        );
        assert!(catalog.by_name("payroll").is_none());
    }

    #[test]
    fn test_spec_names_are_unique() {
        let catalog = GridCatalog::default();
        let mut names: Vec<&str> = catalog.specs().iter().map(|s| s.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }
}
