use anyhow::Result;
use contracts::shared::indicators::*;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use super::compute::{customers, orders, sales};
use super::metadata::ids;
use crate::shared::analytics::{AnalyticsContext, AnalyticsRequest, AnalyticsSource};

type ComputeFn = for<'a> fn(
    &'a dyn AnalyticsSource,
    &'a AnalyticsRequest,
    &'a AnalyticsContext,
) -> Pin<Box<dyn Future<Output = Result<IndicatorValue>> + Send + 'a>>;

/// Central registry: maps `IndicatorId` to its async compute function.
pub struct IndicatorRegistry {
    fns: HashMap<String, ComputeFn>,
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        let mut fns: HashMap<String, ComputeFn> = HashMap::new();

        fns.insert(ids::orders_count().0, |source, request, ctx| {
            Box::pin(orders::compute_orders_count(source, request, ctx))
        });
        fns.insert(ids::sales_total().0, |source, request, ctx| {
            Box::pin(sales::compute_sales_total(source, request, ctx))
        });
        fns.insert(ids::new_customers().0, |source, request, ctx| {
            Box::pin(customers::compute_new_customers(source, request, ctx))
        });
        fns.insert(ids::repeat_customer_rate().0, |source, request, ctx| {
            Box::pin(customers::compute_repeat_customer_rate(source, request, ctx))
        });
        fns.insert(ids::retention_rate().0, |source, request, ctx| {
            Box::pin(customers::compute_retention_rate(source, request, ctx))
        });

        Self { fns }
    }

    /// Compute a batch of indicators, one after another. A failing indicator
    /// degrades to an empty card; unknown ids are skipped.
    pub async fn compute(
        &self,
        ids: &[IndicatorId],
        source: &dyn AnalyticsSource,
        request: &AnalyticsRequest,
        ctx: &AnalyticsContext,
    ) -> Vec<IndicatorValue> {
        let mut results = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(compute_fn) = self.fns.get(&id.0) {
                match compute_fn(source, request, ctx).await {
                    Ok(val) => results.push(val),
                    Err(e) => {
                        tracing::warn!("indicator {} compute error: {e:#}", id.0);
                        results.push(IndicatorValue::unavailable(
                            id.clone(),
                            Some(format!("Error: {e}")),
                        ));
                    }
                }
            } else {
                tracing::warn!("indicator {} not found in registry", id.0);
            }
        }

        results
    }
}
