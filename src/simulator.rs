use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::counter::CounterStore;
use crate::metrics::{CLICKS_TOTAL, VIEWS_TOTAL};
use crate::models::Category;

// What happened while handling one view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOutcome {
    pub category: Category,
    pub clicked: bool,
}

/// Turns a "view" event into counter updates: one view, a random processing
/// delay, then a click with probability `click_probability`.
#[derive(Debug, Clone)]
pub struct RequestSimulator {
    counters: Arc<CounterStore>,
    click_probability: f64,
    max_latency: Duration,
}

impl RequestSimulator {
    pub fn new(counters: Arc<CounterStore>, click_probability: f64, max_latency: Duration) -> Self {
        Self {
            counters,
            click_probability: if click_probability.is_nan() {
                0.0
            } else {
                click_probability.clamp(0.0, 1.0)
            },
            max_latency,
        }
    }

    pub fn random_category() -> Category {
        Category::ALL[rand::thread_rng().gen_range(0..Category::ALL.len())]
    }

    pub async fn handle_view(&self, category: Category) -> ViewOutcome {
        self.counters.increment(category, 1, 0);
        VIEWS_TOTAL.inc();

        // No store lock is held across the delay
        let latency = self.sample_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let clicked = rand::thread_rng().gen_bool(self.click_probability);
        if clicked {
            self.counters.increment(category, 0, 1);
            CLICKS_TOTAL.inc();
        }

        ViewOutcome { category, clicked }
    }

    fn sample_latency(&self) -> Duration {
        if self.max_latency.is_zero() {
            return Duration::ZERO;
        }
        rand::thread_rng().gen_range(Duration::ZERO..self.max_latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tally;

    fn total_for(counters: &CounterStore, category: Category) -> Tally {
        counters
            .snapshot()
            .iter()
            .filter(|(key, _)| key.category == category)
            .fold(Tally::default(), |acc, (_, t)| Tally {
                view: acc.view + t.view,
                click: acc.click + t.click,
            })
    }

    #[tokio::test]
    async fn always_clicks_at_probability_one() {
        let counters = Arc::new(CounterStore::new());
        let simulator = RequestSimulator::new(counters.clone(), 1.0, Duration::ZERO);

        let outcome = simulator.handle_view(Category::Sports).await;

        assert!(outcome.clicked);
        assert_eq!(total_for(&counters, Category::Sports), Tally { view: 1, click: 1 });
    }

    #[tokio::test]
    async fn never_clicks_at_probability_zero() {
        let counters = Arc::new(CounterStore::new());
        let simulator = RequestSimulator::new(counters.clone(), 0.0, Duration::ZERO);

        for _ in 0..20 {
            assert!(!simulator.handle_view(Category::Business).await.clicked);
        }
        assert_eq!(total_for(&counters, Category::Business), Tally { view: 20, click: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_views_are_all_counted() {
        let counters = Arc::new(CounterStore::new());
        let simulator = RequestSimulator::new(counters.clone(), 0.5, Duration::from_millis(50));

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let simulator = simulator.clone();
                tokio::spawn(async move { simulator.handle_view(Category::Entertainment).await })
            })
            .collect();
        let mut clicks = 0;
        for task in tasks {
            if task.await.unwrap().clicked {
                clicks += 1;
            }
        }

        assert_eq!(
            total_for(&counters, Category::Entertainment),
            Tally { view: 50, click: clicks }
        );
    }

    #[test]
    fn probability_is_clamped() {
        let simulator = RequestSimulator::new(Arc::new(CounterStore::new()), 3.0, Duration::ZERO);
        assert_eq!(simulator.click_probability, 1.0);
    }

    #[tokio::test]
    async fn nan_probability_never_clicks() {
        let counters = Arc::new(CounterStore::new());
        let simulator = RequestSimulator::new(counters.clone(), f64::NAN, Duration::ZERO);

        let outcome = simulator.handle_view(Category::Sports).await;

        assert!(!outcome.clicked);
        assert_eq!(total_for(&counters, Category::Sports), Tally { view: 1, click: 0 });
    }

    #[test]
    fn latency_stays_below_max() {
        let simulator =
            RequestSimulator::new(Arc::new(CounterStore::new()), 0.5, Duration::from_millis(50));
        for _ in 0..100 {
            assert!(simulator.sample_latency() < Duration::from_millis(50));
        }
    }
}
