//! Batch processing with user-based partitioning
//!
//! `BatchProcessor` splits a batch of commands by user ID and applies each
//! user's commands in a separate tokio task. Within a task commands run in
//! file order, so a user's replay is deterministic; across tasks users run in
//! parallel and only ever meet on the lock registry map, never on each other's
//! locks.
//!
//! ```text
//! BatchProcessor
//!     └── PointService  (shared stores + lock registry)
//! ```

use std::collections::HashMap;

use tracing::{error, warn};

use crate::core::{
    BalanceStore, HistoryStore, InMemoryHistoryStore, InMemoryPointStore, PointService,
};
use crate::types::{PointCommand, PointError, UserId, UserPoint};

/// Result of applying a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The command that was applied
    pub command: PointCommand,

    /// The balance after the command, or why it was refused
    pub result: Result<UserPoint, PointError>,
}

/// Batch processor with user-based partitioning
pub struct BatchProcessor<B = InMemoryPointStore, H = InMemoryHistoryStore> {
    service: PointService<B, H>,
}

impl<B, H> Clone for BatchProcessor<B, H> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<B, H> BatchProcessor<B, H>
where
    B: BalanceStore + 'static,
    H: HistoryStore + 'static,
{
    /// Create a new BatchProcessor over a shared service
    pub fn new(service: PointService<B, H>) -> Self {
        Self { service }
    }

    /// Partition a batch of commands by user ID
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one sub-batch
    /// - Commands for each user keep their file order
    pub fn partition_by_user(
        &self,
        batch: Vec<PointCommand>,
    ) -> HashMap<UserId, Vec<PointCommand>> {
        let mut user_batches: HashMap<UserId, Vec<PointCommand>> = HashMap::new();

        for command in batch {
            user_batches.entry(command.user).or_default().push(command);
        }

        user_batches
    }

    /// Apply all commands of one user sequentially
    ///
    /// Every command is applied even if earlier ones fail. Results are in
    /// input order.
    pub async fn process_user_commands(
        &self,
        commands: Vec<PointCommand>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(commands.len());

        for command in commands {
            let result = self.service.apply(&command).await;
            if let Err(e) = &result {
                warn!(user = command.user, kind = %command.kind, "Command not applied: {}", e);
            }
            results.push(ProcessingResult { command, result });
        }

        results
    }

    /// Apply a batch with one task per user
    ///
    /// Results are grouped by user; the order between users is unspecified.
    /// A panicked user task fails the whole batch: the outcome of that user's
    /// commands is unknown, so the replay cannot report a trustworthy state.
    pub async fn process_batch(
        &self,
        batch: Vec<PointCommand>,
    ) -> Result<Vec<ProcessingResult>, String> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (user, commands) in user_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move { processor.process_user_commands(commands).await });
            tasks.push((user, task));
        }

        let mut results = Vec::new();
        let mut panicked = Vec::new();
        for (user, task) in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => {
                    error!(user, "Replay task failed: {}", e);
                    panicked.push(user);
                }
            }
        }

        if !panicked.is_empty() {
            panicked.sort_unstable();
            return Err(format!("Replay task failed for users {:?}", panicked));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryPointService, LockRegistry, PointPolicy};
    use crate::types::{Points, TransactionType};
    use std::sync::Arc;

    fn command(kind: TransactionType, user: UserId, amount: i64) -> PointCommand {
        PointCommand { kind, user, amount }
    }

    /// Balance store that panics when user 13 is read
    #[derive(Debug, Default)]
    struct PanickingBalanceStore {
        inner: InMemoryPointStore,
    }

    impl BalanceStore for PanickingBalanceStore {
        fn read(&self, user: UserId) -> Result<UserPoint, PointError> {
            assert_ne!(user, 13, "balance row of user 13 is unreadable");
            self.inner.read(user)
        }

        fn write(&self, user: UserId, point: Points) -> Result<UserPoint, PointError> {
            self.inner.write(user, point)
        }
    }

    fn processor() -> BatchProcessor {
        BatchProcessor::new(InMemoryPointService::in_memory(PointPolicy::default()))
    }

    #[test]
    fn test_partition_by_user_preserves_order() {
        let processor = processor();
        let batch = vec![
            command(TransactionType::Charge, 1, 1_000),
            command(TransactionType::Charge, 2, 2_000),
            command(TransactionType::Use, 1, 500),
            command(TransactionType::Charge, 1, 3_000),
        ];

        let partitions = processor.partition_by_user(batch);

        assert_eq!(partitions.len(), 2);
        let user1: Vec<i64> = partitions[&1].iter().map(|c| c.amount).collect();
        assert_eq!(user1, vec![1_000, 500, 3_000]);
        assert_eq!(partitions[&2].len(), 1);
    }

    #[test]
    fn test_partition_empty_batch() {
        assert!(processor().partition_by_user(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_process_user_commands_continues_after_failure() {
        let processor = processor();
        let commands = vec![
            command(TransactionType::Use, 1, 1_000),
            command(TransactionType::Charge, 1, 4_000),
            command(TransactionType::Use, 1, 1_000),
        ];

        let results = processor.process_user_commands(commands).await;

        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[0].result,
            Err(PointError::InsufficientBalance { .. })
        ));
        assert_eq!(results[1].result.as_ref().unwrap().point, 4_000);
        assert_eq!(results[2].result.as_ref().unwrap().point, 3_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_applies_all_users() {
        let processor = processor();
        let mut batch = Vec::new();
        for user in 1..=20u64 {
            batch.push(command(TransactionType::Charge, user, 10_000));
            batch.push(command(TransactionType::Use, user, 4_000));
        }

        let results = processor.process_batch(batch).await.unwrap();

        assert_eq!(results.len(), 40);
        assert!(results.iter().all(|r| r.result.is_ok()));
        for user in 1..=20u64 {
            let balance = processor.service.get_balance(user).unwrap();
            assert_eq!(balance.point, 6_000);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_batch_fails_when_a_user_task_panics() {
        let processor = BatchProcessor::new(PointService::new(
            Arc::new(PanickingBalanceStore::default()),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(LockRegistry::new()),
            PointPolicy::default(),
        ));
        let batch = vec![
            command(TransactionType::Charge, 1, 1_000),
            command(TransactionType::Charge, 13, 1_000),
            command(TransactionType::Charge, 2, 1_000),
        ];

        let result = processor.process_batch(batch).await;

        assert_eq!(result.unwrap_err(), "Replay task failed for users [13]");
        // Other users were still applied
        assert_eq!(processor.service.get_balance(1).unwrap().point, 1_000);
        assert_eq!(processor.service.get_balance(2).unwrap().point, 1_000);
    }
}
