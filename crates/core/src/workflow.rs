//! Request orchestration: classify, price, and conditionally reserve.
//!
//! Stateless across calls; each request walks the stage machine
//! `Start -> Classified -> Priced -> {Reserved | Rejected} -> Done` and
//! returns a uniform envelope. The workflow never retries, and any store
//! fault collapses into a single generic failure outcome so the transport
//! layer always receives a well-formed envelope.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::domain::mention::ItemMention;
use crate::domain::order::{OrderStatus, OrderSummary, StockCheck};
use crate::domain::product::Product;
use crate::intent::{classify_prompt, Intent, PromptAnalysis};
use crate::pricing::{evaluate_order, OrderEvaluation};
use crate::reservation::ReservationEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Start,
    Classified,
    Priced,
    Reserved,
    Rejected,
    Done,
}

impl WorkflowStage {
    pub fn can_advance(self, next: WorkflowStage) -> bool {
        use WorkflowStage::{Classified, Done, Priced, Rejected, Reserved, Start};
        matches!(
            (self, next),
            (Start, Classified)
                | (Classified, Priced)
                | (Classified, Done)
                | (Priced, Reserved)
                | (Priced, Rejected)
                // Informational requests stop after pricing without a
                // reservation verdict.
                | (Priced, Done)
                | (Reserved, Done)
                | (Rejected, Done)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub components_used: Vec<String>,
    pub action_performed: String,
    pub stages: Vec<WorkflowStage>,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Uniform result envelope returned for every request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub success: bool,
    pub summary: String,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_summary: Option<OrderSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stock_checks: Vec<StockCheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_preview: Vec<Product>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    pub metadata: WorkflowMetadata,
}

/// How many products the mention-less inquiry branch previews.
const CATALOG_PREVIEW_LIMIT: usize = 6;

pub struct OrderWorkflow<S> {
    store: Arc<S>,
    reservations: ReservationEngine<S>,
}

struct RequestTrace {
    started: Instant,
    stage: WorkflowStage,
    stages: Vec<WorkflowStage>,
    components: Vec<String>,
}

impl RequestTrace {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            stage: WorkflowStage::Start,
            stages: vec![WorkflowStage::Start],
            components: vec!["workflow".to_owned()],
        }
    }

    fn advance(&mut self, next: WorkflowStage) {
        debug_assert!(self.stage.can_advance(next), "{:?} -> {next:?}", self.stage);
        self.stage = next;
        self.stages.push(next);
    }

    fn using(&mut self, component: &str) {
        self.components.push(component.to_owned());
    }

    fn finish(mut self, action: &str) -> WorkflowMetadata {
        if self.stage != WorkflowStage::Done {
            self.advance(WorkflowStage::Done);
        }
        WorkflowMetadata {
            components_used: self.components,
            action_performed: action.to_owned(),
            stages: self.stages,
            execution_time_ms: self.started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        }
    }
}

impl<S> OrderWorkflow<S>
where
    S: CatalogStore,
{
    pub fn new(store: Arc<S>) -> Self {
        let reservations = ReservationEngine::new(Arc::clone(&store));
        Self { store, reservations }
    }

    pub async fn process(&self, prompt: &str) -> WorkflowOutcome {
        self.run(classify_prompt(prompt)).await
    }

    /// Run a pre-classified analysis through the pricing and reservation
    /// stages. Alternative front ends share this entry point with
    /// [`OrderWorkflow::process`].
    pub async fn run(&self, analysis: PromptAnalysis) -> WorkflowOutcome {
        let mut trace = RequestTrace::new();

        trace.using("intent-classifier");
        trace.advance(WorkflowStage::Classified);
        info!(
            event_name = "workflow.classified",
            intent = ?analysis.intent,
            mention_count = analysis.mentions.len(),
            confidence = analysis.confidence,
            "prompt classified"
        );

        match analysis.intent {
            Intent::GeneralQuestion => self.general_question(trace),
            Intent::ProductInquiry if analysis.mentions.is_empty() => {
                self.catalog_preview(trace).await
            }
            Intent::ProductInquiry => self.product_inquiry(trace, &analysis.mentions).await,
            Intent::CheckAvailability => self.check_availability(trace, &analysis.mentions).await,
            Intent::PlaceOrder => self.place_order(trace, &analysis.mentions).await,
        }
    }

    fn general_question(&self, trace: RequestTrace) -> WorkflowOutcome {
        WorkflowOutcome {
            success: true,
            summary: "No products recognized in the request".to_owned(),
            intent: Intent::GeneralQuestion,
            order_summary: None,
            stock_checks: Vec::new(),
            catalog_preview: Vec::new(),
            next_actions: vec![
                "Ask about specific products".to_owned(),
                "Browse our toy categories".to_owned(),
                "Place an order".to_owned(),
            ],
            order_reference: None,
            metadata: trace.finish("general_question"),
        }
    }

    async fn catalog_preview(&self, mut trace: RequestTrace) -> WorkflowOutcome {
        trace.using("catalog-store");
        let state = match self.store.load().await {
            Ok(state) => state,
            Err(fault) => return Self::internal_failure(trace, Intent::ProductInquiry, &fault),
        };

        let preview: Vec<Product> =
            state.products.iter().take(CATALOG_PREVIEW_LIMIT).cloned().collect();

        WorkflowOutcome {
            success: true,
            summary: format!("Showing {} of {} products", preview.len(), state.products.len()),
            intent: Intent::ProductInquiry,
            order_summary: None,
            stock_checks: Vec::new(),
            catalog_preview: preview,
            next_actions: vec![
                "Ask about a specific product".to_owned(),
                "Place an order".to_owned(),
            ],
            order_reference: None,
            metadata: trace.finish("catalog_preview"),
        }
    }

    async fn product_inquiry(
        &self,
        mut trace: RequestTrace,
        mentions: &[ItemMention],
    ) -> WorkflowOutcome {
        let Some(evaluation) = self.price(&mut trace, mentions).await else {
            return Self::internal_failure_outcome(trace, Intent::ProductInquiry);
        };

        let found = evaluation.stock_checks.len();
        WorkflowOutcome {
            success: found > 0,
            summary: if found > 0 {
                format!("Found {found} matching products")
            } else {
                "No matching products found".to_owned()
            },
            intent: Intent::ProductInquiry,
            order_summary: Some(evaluation.summary),
            stock_checks: evaluation.stock_checks,
            catalog_preview: Vec::new(),
            next_actions: vec!["Place an order for these items".to_owned()],
            order_reference: None,
            metadata: trace.finish("product_inquiry"),
        }
    }

    async fn check_availability(
        &self,
        mut trace: RequestTrace,
        mentions: &[ItemMention],
    ) -> WorkflowOutcome {
        let Some(evaluation) = self.price(&mut trace, mentions).await else {
            return Self::internal_failure_outcome(trace, Intent::CheckAvailability);
        };
        trace.advance(WorkflowStage::Rejected);

        let summary = evaluation.summary;
        WorkflowOutcome {
            success: true,
            summary: format!("Order check complete: {}", status_line(&summary)),
            intent: Intent::CheckAvailability,
            next_actions: next_actions_for(summary.status),
            order_summary: Some(summary),
            stock_checks: evaluation.stock_checks,
            catalog_preview: Vec::new(),
            order_reference: None,
            metadata: trace.finish("order_availability_check"),
        }
    }

    async fn place_order(
        &self,
        mut trace: RequestTrace,
        mentions: &[ItemMention],
    ) -> WorkflowOutcome {
        let Some(evaluation) = self.price(&mut trace, mentions).await else {
            return Self::internal_failure_outcome(trace, Intent::PlaceOrder);
        };
        let summary = evaluation.summary;

        if summary.status != OrderStatus::Available {
            trace.advance(WorkflowStage::Rejected);
            return WorkflowOutcome {
                success: false,
                summary: format!("Order cannot be completed: {}", status_line(&summary)),
                intent: Intent::PlaceOrder,
                next_actions: next_actions_for(summary.status),
                order_summary: Some(summary),
                stock_checks: evaluation.stock_checks,
                catalog_preview: Vec::new(),
                order_reference: None,
                metadata: trace.finish("order_placement_unavailable"),
            };
        }

        trace.using("reservation-engine");
        let reservation = self.reservations.reserve(&summary).await;

        if reservation.success {
            trace.advance(WorkflowStage::Reserved);
            let order_reference = format!("ORD-{}", Uuid::new_v4());
            WorkflowOutcome {
                success: true,
                summary: format!(
                    "Order placed: {} items reserved, total {}",
                    summary.lines.len(),
                    summary.total
                ),
                intent: Intent::PlaceOrder,
                order_summary: Some(summary),
                stock_checks: evaluation.stock_checks,
                catalog_preview: Vec::new(),
                next_actions: vec![
                    "Order confirmation sent".to_owned(),
                    "Items reserved in inventory".to_owned(),
                    "Shipping notification will follow".to_owned(),
                ],
                order_reference: Some(order_reference),
                metadata: trace.finish("order_placed_and_reserved"),
            }
        } else {
            trace.advance(WorkflowStage::Rejected);
            WorkflowOutcome {
                success: false,
                summary: format!("Order could not be completed: {}", reservation.message),
                intent: Intent::PlaceOrder,
                order_summary: Some(summary),
                stock_checks: evaluation.stock_checks,
                catalog_preview: Vec::new(),
                next_actions: next_actions_for(OrderStatus::Unavailable),
                order_reference: None,
                metadata: trace.finish("order_reservation_failed"),
            }
        }
    }

    async fn price(
        &self,
        trace: &mut RequestTrace,
        mentions: &[ItemMention],
    ) -> Option<OrderEvaluation> {
        trace.using("catalog-store");
        trace.using("availability-engine");
        let state = match self.store.load().await {
            Ok(state) => state,
            Err(fault) => {
                error!(event_name = "workflow.catalog_fault", error = %fault, "catalog load failed");
                return None;
            }
        };
        let evaluation = evaluate_order(&state, mentions);
        trace.advance(WorkflowStage::Priced);
        Some(evaluation)
    }

    fn internal_failure(
        trace: RequestTrace,
        intent: Intent,
        fault: &crate::catalog::CatalogError,
    ) -> WorkflowOutcome {
        error!(event_name = "workflow.catalog_fault", error = %fault, "catalog load failed");
        Self::internal_failure_outcome(trace, intent)
    }

    fn internal_failure_outcome(trace: RequestTrace, intent: Intent) -> WorkflowOutcome {
        WorkflowOutcome {
            success: false,
            summary: "Could not process the request; please try again later".to_owned(),
            intent,
            order_summary: None,
            stock_checks: Vec::new(),
            catalog_preview: Vec::new(),
            next_actions: Vec::new(),
            order_reference: None,
            metadata: trace.finish("error_handling"),
        }
    }
}

fn status_line(summary: &OrderSummary) -> String {
    match summary.status {
        OrderStatus::Available => {
            format!("all {} items are available, total {}", summary.lines.len(), summary.total)
        }
        OrderStatus::Partial => format!(
            "{} items available, {} unavailable",
            summary.lines.len(),
            summary.unavailable_items.len()
        ),
        OrderStatus::Unavailable => "none of the requested items are available".to_owned(),
    }
}

fn next_actions_for(status: OrderStatus) -> Vec<String> {
    match status {
        OrderStatus::Available => vec![
            "Reply \"CONFIRM ORDER\" to place this order".to_owned(),
            "Ask questions about shipping or returns".to_owned(),
        ],
        OrderStatus::Partial => vec![
            "Reply \"CONFIRM PARTIAL\" to order available items only".to_owned(),
            "Reply \"WAIT RESTOCK\" to be notified when all items are available".to_owned(),
        ],
        OrderStatus::Unavailable => vec![
            "Browse our available products".to_owned(),
            "Ask for alternative product suggestions".to_owned(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use tokio::sync::Mutex;

    use crate::catalog::{
        CatalogError, CatalogMutation, CatalogState, CatalogStore, StorePolicy,
    };
    use crate::domain::order::OrderStatus;
    use crate::domain::product::{Product, ProductId};
    use crate::domain::reservation::StockDelta;
    use crate::intent::{Intent, PromptAnalysis};

    use super::{OrderWorkflow, WorkflowStage};

    struct TestStore {
        state: Mutex<CatalogState>,
        fail_load: AtomicBool,
    }

    #[async_trait]
    impl CatalogStore for TestStore {
        async fn load(&self) -> Result<CatalogState, CatalogError> {
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(CatalogError::Load("io failure".to_owned()));
            }
            Ok(self.state.lock().await.clone())
        }

        async fn update(
            &self,
            mutation: CatalogMutation,
        ) -> Result<Vec<StockDelta>, CatalogError> {
            let mut guard = self.state.lock().await;
            let mut working = guard.clone();
            let deltas = mutation(&mut working)?;
            *guard = working;
            Ok(deltas)
        }
    }

    fn store() -> Arc<TestStore> {
        let products = vec![
            Product {
                id: ProductId("lego-creator-01".to_owned()),
                name: "LEGO Creator Townhouse".to_owned(),
                price: dec!(10.00),
                stock: 5,
                category: "building".to_owned(),
                age_range: "8+".to_owned(),
                description: String::new(),
            },
            Product {
                id: ProductId("monopoly-01".to_owned()),
                name: "Monopoly Classic".to_owned(),
                price: dec!(29.99),
                stock: 2,
                category: "board games".to_owned(),
                age_range: "8+".to_owned(),
                description: String::new(),
            },
        ];
        Arc::new(TestStore {
            state: Mutex::new(CatalogState {
                products,
                policy: StorePolicy {
                    name: "Toy Corner".to_owned(),
                    location: "Alphen aan den Rijn".to_owned(),
                    phone: "+31 123 456 789".to_owned(),
                    email: "hello@toycorner.example".to_owned(),
                    currency: "EUR".to_owned(),
                    tax_rate: dec!(0.21),
                    shipping_cost: dec!(4.95),
                    free_shipping_threshold: dec!(50),
                },
            }),
            fail_load: AtomicBool::new(false),
        })
    }

    async fn stock_of(store: &TestStore, id: &str) -> u32 {
        store
            .state
            .lock()
            .await
            .get(&ProductId(id.to_owned()))
            .map(|product| product.stock)
            .unwrap_or_default()
    }

    #[test]
    fn stage_machine_rejects_skipped_transitions() {
        assert!(WorkflowStage::Start.can_advance(WorkflowStage::Classified));
        assert!(WorkflowStage::Priced.can_advance(WorkflowStage::Reserved));
        assert!(WorkflowStage::Priced.can_advance(WorkflowStage::Rejected));
        assert!(!WorkflowStage::Start.can_advance(WorkflowStage::Priced));
        assert!(!WorkflowStage::Classified.can_advance(WorkflowStage::Reserved));
        assert!(!WorkflowStage::Done.can_advance(WorkflowStage::Start));
    }

    #[tokio::test]
    async fn place_order_reserves_stock_and_issues_a_reference() {
        let store = store();
        let workflow = OrderWorkflow::new(Arc::clone(&store));

        let outcome =
            workflow.process("Please place my order for 2 LEGO Creator townhouse").await;

        assert!(outcome.success);
        assert_eq!(outcome.intent, Intent::PlaceOrder);
        assert!(outcome.order_reference.as_deref().is_some_and(|r| r.starts_with("ORD-")));
        assert_eq!(outcome.metadata.action_performed, "order_placed_and_reserved");
        assert!(outcome.metadata.stages.contains(&WorkflowStage::Reserved));
        assert_eq!(stock_of(&store, "lego-creator-01").await, 3);
    }

    #[tokio::test]
    async fn check_availability_never_mutates_stock() {
        let store = store();
        let workflow = OrderWorkflow::new(Arc::clone(&store));

        let outcome = workflow.process("I want to order 2 LEGO Creator townhouse").await;

        assert!(outcome.success);
        assert_eq!(outcome.intent, Intent::CheckAvailability);
        let summary = outcome.order_summary.expect("summary");
        assert_eq!(summary.status, OrderStatus::Available);
        assert_eq!(summary.subtotal, dec!(20.00));
        assert_eq!(summary.total, dec!(29.15));
        assert!(outcome.metadata.stages.contains(&WorkflowStage::Rejected));
        assert_eq!(stock_of(&store, "lego-creator-01").await, 5);
    }

    #[tokio::test]
    async fn partial_order_placement_is_rejected_without_reserving() {
        let store = store();
        let workflow = OrderWorkflow::new(Arc::clone(&store));

        let outcome = workflow
            .process("Please place my order for 2 LEGO Creator townhouse and 5 Monopoly games")
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.metadata.action_performed, "order_placement_unavailable");
        let summary = outcome.order_summary.expect("summary");
        assert_eq!(summary.status, OrderStatus::Partial);
        assert_eq!(stock_of(&store, "lego-creator-01").await, 5);
        assert_eq!(stock_of(&store, "monopoly-01").await, 2);
    }

    #[tokio::test]
    async fn general_question_bypasses_pricing() {
        let workflow = OrderWorkflow::new(store());

        let outcome = workflow.process("What are your opening hours?").await;

        assert!(outcome.success);
        assert_eq!(outcome.intent, Intent::GeneralQuestion);
        assert!(outcome.order_summary.is_none());
        assert!(!outcome.metadata.stages.contains(&WorkflowStage::Priced));
        assert!(!outcome.metadata.components_used.iter().any(|c| c == "availability-engine"));
    }

    #[tokio::test]
    async fn mention_less_inquiry_previews_the_catalog() {
        // An alternative front end can classify a browsing request as a
        // product inquiry without extracting any mention.
        let workflow = OrderWorkflow::new(store());

        let outcome = workflow
            .run(PromptAnalysis {
                intent: Intent::ProductInquiry,
                mentions: Vec::new(),
                confidence: 0.7,
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.intent, Intent::ProductInquiry);
        assert_eq!(outcome.catalog_preview.len(), 2);
        assert_eq!(outcome.metadata.action_performed, "catalog_preview");
    }

    #[tokio::test]
    async fn inquiry_with_mentions_reports_stock_details() {
        let workflow = OrderWorkflow::new(store());

        let outcome = workflow.process("tell me about the monopoly board game").await;

        assert_eq!(outcome.intent, Intent::ProductInquiry);
        assert!(outcome.success);
        assert_eq!(outcome.stock_checks.len(), 1);
        assert_eq!(outcome.stock_checks[0].product.id.0, "monopoly-01");
    }

    #[tokio::test]
    async fn store_fault_collapses_into_a_generic_failure_envelope() {
        let store = store();
        store.fail_load.store(true, Ordering::SeqCst);
        let workflow = OrderWorkflow::new(Arc::clone(&store));

        let outcome = workflow.process("I want to order 2 LEGO Creator townhouse").await;

        assert!(!outcome.success);
        assert_eq!(outcome.metadata.action_performed, "error_handling");
        assert!(outcome.summary.contains("Could not process"));
        assert!(outcome.order_summary.is_none());
    }
}
