pub mod aggregation;
pub mod config;
pub mod datasource;
pub mod date_math;
pub mod decimal;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod schedule;
pub mod types;

use std::sync::Once;

// re-export key types
pub use aggregation::{AggregationEngine, FetchOutcome, PendingLoad, SummaryEvent, UserAccountSummary};
pub use config::{EngineConfig, ReconciliationPolicy, ScheduleAnchor, TotalPrecedence};
pub use datasource::{load_user_data, DataSource, InMemoryDataSource};
pub use date_math::{add_months, days_until};
pub use decimal::{Money, Rate};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::{CashKickError, Result};
pub use models::{
    Account, CashKickDraw, FinancingContract, SelectedContracts, SelectedContractsMapping,
};
pub use resolver::ContractResolver;
pub use schedule::{PaymentSchedule, PaymentScheduleEntry, ScheduleBuilder};
pub use types::{ContractId, DrawStatus, Id, IdRef, PaymentStatus, Source, UserId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;

static INIT_TRACING: Once = Once::new();

/// install a global fmt subscriber, `RUST_LOG` overrides the `cash_kick_rs=info` default
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = match "cash_kick_rs=info".parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };

        // another subscriber may already be installed by the host application
        let _ = fmt().with_env_filter(filter).try_init();
        tracing::info!("cash kick tracing initialized");
    });
}
