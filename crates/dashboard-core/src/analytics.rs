//! Read-only aggregate queries over the record store

use dashboard_api::{AccountRow, CategorySlice, MetricsView, MonthlyRegistrations, RevenuePoint};
use dashboard_config::ActiveSessionsMode;
use dashboard_store::RecordStore;
use dashboard_util::{AccountId, Result, month_key};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Derived dashboard metrics. Every query is side-effect free.
pub struct Analytics {
    store: Arc<dyn RecordStore>,
    active_sessions: ActiveSessionsMode,
}

impl Analytics {
    pub fn new(store: Arc<dyn RecordStore>, active_sessions: ActiveSessionsMode) -> Self {
        Self {
            store,
            active_sessions,
        }
    }

    /// Headline metrics.
    ///
    /// In `Random` mode `active_sessions` is a placeholder drawn on every
    /// call and is not reproducible.
    pub fn metrics(&self) -> Result<MetricsView> {
        let accounts = self.store.list_accounts()?;
        let revenue = self.store.list_revenue_events()?;

        let active_sessions = match self.active_sessions {
            ActiveSessionsMode::Random { min, max } => rand::thread_rng().gen_range(min..=max),
            ActiveSessionsMode::LoggedIn => {
                accounts.iter().filter(|a| a.is_logged_in).count() as u32
            }
        };

        Ok(MetricsView {
            total_users: accounts.len(),
            active_sessions,
            sales_revenue: revenue.iter().map(|e| e.amount).sum(),
        })
    }

    /// Revenue ordered by date; ties keep insertion order
    pub fn revenue_series(&self) -> Result<Vec<RevenuePoint>> {
        let mut events = self.store.list_revenue_events()?;
        events.sort_by_key(|e| e.date);

        Ok(events
            .into_iter()
            .map(|e| RevenuePoint {
                date: e.date,
                revenue: e.amount,
            })
            .collect())
    }

    /// Registration counts per `YYYY-MM`, ascending
    pub fn registrations_by_month(&self) -> Result<Vec<MonthlyRegistrations>> {
        let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
        for account in self.store.list_accounts()? {
            *buckets.entry(month_key(account.registered_on)).or_default() += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|(month, users)| MonthlyRegistrations { month, users })
            .collect())
    }

    /// Category allocations as stored
    pub fn category_breakdown(&self) -> Result<Vec<CategorySlice>> {
        Ok(self
            .store
            .list_category_allocations()?
            .into_iter()
            .map(|c| CategorySlice {
                name: c.label,
                value: c.weight,
            })
            .collect())
    }

    /// Every account, marking only `viewer` as logged in.
    ///
    /// The marker reflects the local session, not the stored flags.
    pub fn accounts_view(&self, viewer: Option<&AccountId>) -> Result<Vec<AccountRow>> {
        Ok(self
            .store
            .list_accounts()?
            .into_iter()
            .map(|a| AccountRow {
                is_logged_in: viewer == Some(&a.id),
                id: a.id,
                full_name: a.full_name,
                email: a.email,
                registration_date: a.registered_on,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_store::{NewAccount, RevenueEvent, SeedData, SqliteStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_analytics(seed: &SeedData, mode: ActiveSessionsMode) -> (Analytics, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.seed_if_empty(seed).unwrap();
        (Analytics::new(store.clone(), mode), store)
    }

    #[test]
    fn test_metrics_random_within_bounds() {
        let seed = SeedData::demo();
        let (analytics, _) =
            make_analytics(&seed, ActiveSessionsMode::Random { min: 50, max: 500 });

        for _ in 0..20 {
            let metrics = analytics.metrics().unwrap();
            assert_eq!(metrics.total_users, seed.accounts.len());
            assert!((50..=500).contains(&metrics.active_sessions));
            assert_eq!(metrics.sales_revenue, 28000.0);
        }
    }

    #[test]
    fn test_metrics_logged_in_count() {
        let (analytics, store) = make_analytics(&SeedData::demo(), ActiveSessionsMode::LoggedIn);
        assert_eq!(analytics.metrics().unwrap().active_sessions, 0);

        store.set_login_flag(&AccountId::new("user-2"), true).unwrap();
        assert_eq!(analytics.metrics().unwrap().active_sessions, 1);
    }

    #[test]
    fn test_revenue_series_sorted_and_stable() {
        let seed = SeedData {
            revenue: vec![
                RevenueEvent {
                    date: date(2025, 3, 1),
                    amount: 3.0,
                },
                RevenueEvent {
                    date: date(2025, 1, 1),
                    amount: 1.0,
                },
                RevenueEvent {
                    date: date(2025, 3, 1),
                    amount: 4.0,
                },
                RevenueEvent {
                    date: date(2025, 2, 1),
                    amount: 2.0,
                },
            ],
            ..SeedData::default()
        };
        let (analytics, _) = make_analytics(&seed, ActiveSessionsMode::LoggedIn);

        let series = analytics.revenue_series().unwrap();
        let amounts: Vec<f64> = series.iter().map(|p| p.revenue).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(series.windows(2).all(|w| w[0].date <= w[1].date));

        // Idempotent
        assert_eq!(analytics.revenue_series().unwrap(), series);
    }

    #[test]
    fn test_registrations_grouped_by_month() {
        let (analytics, store) = make_analytics(&SeedData::default(), ActiveSessionsMode::LoggedIn);
        for (email, on) in [
            ("a@x.com", date(2025, 5, 2)),
            ("b@x.com", date(2025, 5, 30)),
            ("c@x.com", date(2025, 4, 9)),
        ] {
            store
                .insert_account(NewAccount {
                    full_name: "Someone".into(),
                    email: email.into(),
                    secret: "secret1".into(),
                    registered_on: on,
                })
                .unwrap();
        }

        let months = analytics.registrations_by_month().unwrap();
        assert_eq!(
            months,
            vec![
                MonthlyRegistrations {
                    month: "2025-04".into(),
                    users: 1,
                },
                MonthlyRegistrations {
                    month: "2025-05".into(),
                    users: 2,
                },
            ]
        );
    }

    #[test]
    fn test_category_breakdown_verbatim() {
        let seed = SeedData::demo();
        let (analytics, _) = make_analytics(&seed, ActiveSessionsMode::LoggedIn);

        let slices = analytics.category_breakdown().unwrap();
        assert_eq!(slices.len(), seed.categories.len());
        assert_eq!(slices[0].name, "Electronics");
        assert_eq!(slices[0].value, 400.0);
    }

    #[test]
    fn test_accounts_view_marks_viewer_only() {
        let (analytics, store) = make_analytics(&SeedData::demo(), ActiveSessionsMode::LoggedIn);

        // A stored flag for someone else does not leak into the view
        store.set_login_flag(&AccountId::new("user-3"), true).unwrap();

        let viewer = AccountId::new("user-1");
        let rows = analytics.accounts_view(Some(&viewer)).unwrap();
        let marked: Vec<_> = rows.iter().filter(|r| r.is_logged_in).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id, viewer);

        let rows = analytics.accounts_view(None).unwrap();
        assert!(rows.iter().all(|r| !r.is_logged_in));
    }
}
