use tokio_cron_scheduler::{Job, JobScheduler};

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::aoc::client::LeaderboardClient;
use crate::error::{BotError, BotResult};
use crate::storage::MemoryCache;

pub struct Scheduler {
    scheduler: JobScheduler,
    client: Arc<dyn LeaderboardClient>,
    cache: MemoryCache,
    cancellation: CancellationToken,
}

pub enum JobProcess {
    InitializePrivateLeaderboard, // only ran once, at startup.
    UpdatePrivateLeaderboard(Duration),
}

impl Scheduler {
    pub async fn new(
        client: Arc<dyn LeaderboardClient>,
        cache: MemoryCache,
        cancellation: CancellationToken,
    ) -> BotResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler {
            scheduler,
            client,
            cache,
            cancellation,
        })
    }

    pub async fn add_job(&self, job_process: JobProcess) -> BotResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::InitializePrivateLeaderboard => initialize_private_leaderboard_job(
                self.client.clone(),
                self.cache.clone(),
                self.cancellation.clone(),
            )?,
            JobProcess::UpdatePrivateLeaderboard(interval) => update_private_leaderboard_job(
                interval,
                self.client.clone(),
                self.cache.clone(),
                self.cancellation.clone(),
            )?,
        };
        Ok(self.scheduler.add(job).await?)
    }

    /// Starts the jobs. The scheduler is shut down once the cancellation token fires.
    pub async fn start(&self) -> BotResult<()> {
        self.scheduler.start().await?;

        let mut scheduler = self.scheduler.clone();
        let cancellation = self.cancellation.clone();
        tokio::spawn(async move {
            cancellation.cancelled().await;
            match scheduler.shutdown().await {
                Ok(()) => info!("Scheduler shut down."),
                Err(e) => error!("{}", BotError::from(e)),
            }
        });

        Ok(())
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }
}

/// One refresh tick: fetch the private leaderboard and replace the cached
/// snapshot on success. On failure the cached snapshot is left untouched.
pub async fn refresh(client: &dyn LeaderboardClient, cache: &MemoryCache) -> BotResult<usize> {
    match client.private_leaderboard().await {
        Ok(snapshot) => {
            let n_members = snapshot.len();
            cache.set(snapshot);
            info!("Private leaderboard refreshed ({n_members} members).");
            Ok(n_members)
        }
        Err(e) => {
            let error = BotError::AOC(format!("Could not fetch private leaderboard. {e}"));
            error!("{error}");
            Err(error)
        }
    }
}

//////////////////
// Jobs definition
//////////////////

fn initialize_private_leaderboard_job(
    client: Arc<dyn LeaderboardClient>,
    cache: MemoryCache,
    cancellation: CancellationToken,
) -> BotResult<Job> {
    let job = Job::new_one_shot_async(Duration::from_secs(0), move |_uuid, _l| {
        let client = client.clone();
        let cache = cache.clone();
        let cancellation = cancellation.clone();
        Box::pin(async move {
            if cancellation.is_cancelled() {
                return;
            }
            // Failures are logged by refresh, the next tick will try again.
            let _ = refresh(client.as_ref(), &cache).await;
        })
    })?;
    Ok(job)
}

fn update_private_leaderboard_job(
    interval: Duration,
    client: Arc<dyn LeaderboardClient>,
    cache: MemoryCache,
    cancellation: CancellationToken,
) -> BotResult<Job> {
    let job = Job::new_repeated_async(interval, move |uuid, mut l| {
        let client = client.clone();
        let cache = cache.clone();
        let cancellation = cancellation.clone();
        Box::pin(async move {
            if cancellation.is_cancelled() {
                warn!("Skipping private leaderboard refresh, shutdown in progress.");
                return;
            }
            let _ = refresh(client.as_ref(), &cache).await;

            // Query the next execution time for this job
            let next_tick = l.next_tick_for_job(uuid).await;
            match next_tick {
                Ok(Some(ts)) => info!("Next refresh for private leaderboard at {:?}", ts),
                _ => error!("Could not get next tick for refresh private leaderboard job"),
            }
        })
    })?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoc::leaderboard::{snapshot_with_scores, LeaderboardSnapshot};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Replays the queued results, then keeps failing.
    struct ScriptedClient {
        results: Mutex<VecDeque<BotResult<LeaderboardSnapshot>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(results: Vec<BotResult<LeaderboardSnapshot>>) -> Self {
            ScriptedClient {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LeaderboardClient for ScriptedClient {
        async fn private_leaderboard(&self) -> BotResult<LeaderboardSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BotError::Http("503 Service Unavailable".to_string())))
        }
    }

    #[tokio::test]
    async fn refresh_replaces_cached_snapshot() {
        let first = snapshot_with_scores(&[("a", 10)]);
        let second = snapshot_with_scores(&[("b", 20), ("c", 30)]);
        let client = ScriptedClient::new(vec![Ok(first), Ok(second.clone())]);
        let cache = MemoryCache::new();

        assert_eq!(refresh(&client, &cache).await.unwrap(), 1);
        assert_eq!(refresh(&client, &cache).await.unwrap(), 2);

        assert_eq!(*cache.get().unwrap(), second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let snapshot = snapshot_with_scores(&[("a", 10)]);
        let client = ScriptedClient::new(vec![Ok(snapshot.clone())]);
        let cache = MemoryCache::new();

        refresh(&client, &cache).await.unwrap();
        assert!(refresh(&client, &cache).await.is_err());

        assert_eq!(*cache.get().unwrap(), snapshot);
    }

    #[tokio::test]
    async fn failed_first_refresh_leaves_cache_empty() {
        let client = ScriptedClient::new(vec![]);
        let cache = MemoryCache::new();

        assert!(refresh(&client, &cache).await.is_err());
        assert!(cache.get().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn startup_job_populates_cache() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(snapshot_with_scores(&[(
            "a", 10,
        )]))]));
        let cancellation = CancellationToken::new();
        let scheduler = Scheduler::new(client, MemoryCache::new(), cancellation.clone())
            .await
            .unwrap();
        scheduler
            .add_job(JobProcess::InitializePrivateLeaderboard)
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        let mut populated = false;
        for _ in 0..50 {
            if scheduler.cache().get().is_some() {
                populated = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        cancellation.cancel();

        assert!(populated);
    }
}
