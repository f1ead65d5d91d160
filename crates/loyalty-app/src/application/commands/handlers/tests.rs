use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::application::commands::check_in_commands::*;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::handlers::*;
use crate::application::services::NftPointsService;
use loyalty_domain::check_in::{CheckInRecord, CheckInRepository, Multiplier};
use loyalty_domain::nft::{
    EligibleNft, NftKey, NftPoints, NftPointsResolver, NftUsage, NftUsageRepository,
};
use loyalty_domain::shared::{CheckInId, DomainError, WalletAddress};
use loyalty_domain::user::{LoyaltyUser, UserRepository};

// Mock repositories and services for testing

mockall::mock! {
    Resolver {}

    #[async_trait::async_trait]
    impl NftPointsResolver for Resolver {
        async fn resolve(&self, wallet_address: &WalletAddress) -> Result<NftPoints, DomainError>;
    }
}

struct MockUserRepository {
    users: tokio::sync::RwLock<HashMap<String, LoyaltyUser>>,
    /// Written just before the next conditional update, as if another request won
    concurrent_update: Mutex<Option<LoyaltyUser>>,
    /// Inserted just before the next create, as if another request won
    concurrent_create: Mutex<Option<LoyaltyUser>>,
}

impl MockUserRepository {
    fn new() -> Self {
        Self {
            users: tokio::sync::RwLock::new(HashMap::new()),
            concurrent_update: Mutex::new(None),
            concurrent_create: Mutex::new(None),
        }
    }

    async fn get(&self, wallet: &str) -> Option<LoyaltyUser> {
        self.users.read().await.get(wallet).cloned()
    }
}

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
    ) -> Result<Option<LoyaltyUser>, DomainError> {
        Ok(self.get(wallet_address.as_str()).await)
    }

    async fn create(&self, user: &LoyaltyUser) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if let Some(winner) = self.concurrent_create.lock().unwrap().take() {
            users.insert(winner.wallet_address().as_str().to_string(), winner);
        }
        let key = user.wallet_address().as_str().to_string();
        if users.contains_key(&key) {
            return Err(DomainError::ConstraintViolation(format!(
                "UNIQUE constraint failed: users.wallet_address ({})",
                key
            )));
        }
        users.insert(key, user.clone());
        Ok(())
    }

    async fn record_check_in(
        &self,
        user: &LoyaltyUser,
        expected_total_check_ins: u32,
    ) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        if let Some(winner) = self.concurrent_update.lock().unwrap().take() {
            users.insert(winner.wallet_address().as_str().to_string(), winner);
        }
        let key = user.wallet_address().as_str();
        match users.get(key) {
            Some(stored) if stored.total_check_ins() == expected_total_check_ins => {
                let mut updated = user.clone();
                updated.sync_total_points(stored.total_points());
                users.insert(key.to_string(), updated);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_points(
        &self,
        wallet_address: &WalletAddress,
        points: f64,
    ) -> Result<f64, DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(wallet_address.as_str())
            .ok_or_else(|| DomainError::NotFound(wallet_address.to_string()))?;
        let total = user.total_points() + points;
        user.sync_total_points(total);
        Ok(total)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LoyaltyUser>, DomainError> {
        let users = self.users.read().await;
        let mut all: Vec<LoyaltyUser> = users.values().cloned().collect();
        all.sort_by_key(|u| std::cmp::Reverse(u.last_check_in()));
        all.truncate(limit as usize);
        Ok(all)
    }
}

struct MockCheckInRepository {
    records: tokio::sync::RwLock<Vec<CheckInRecord>>,
    fail_saves: bool,
}

impl MockCheckInRepository {
    fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
            fail_saves: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::new()
        }
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait::async_trait]
impl CheckInRepository for MockCheckInRepository {
    async fn save(&self, record: &CheckInRecord) -> Result<(), DomainError> {
        if self.fail_saves {
            return Err(DomainError::Repository("disk I/O error".to_string()));
        }
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
        limit: u32,
    ) -> Result<Vec<CheckInRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.wallet_address() == wallet_address)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct MockNftUsageRepository {
    usage: tokio::sync::RwLock<Vec<NftUsage>>,
    /// Lookups see nothing, as if the competing insert landed after the read
    stale_lookups: bool,
    broken_key: Option<NftKey>,
}

impl MockNftUsageRepository {
    fn new() -> Self {
        Self {
            usage: tokio::sync::RwLock::new(Vec::new()),
            stale_lookups: false,
            broken_key: None,
        }
    }

    async fn seed(&self, key: NftKey, wallet: &str, at: DateTime<Utc>) {
        self.usage.write().await.push(NftUsage::new(
            key,
            WalletAddress::parse(wallet).unwrap(),
            CheckInId::new(),
            at,
        ));
    }

    async fn count(&self) -> usize {
        self.usage.read().await.len()
    }
}

#[async_trait::async_trait]
impl NftUsageRepository for MockNftUsageRepository {
    async fn record(&self, usage: &NftUsage) -> Result<(), DomainError> {
        if self.broken_key.as_ref() == Some(usage.key()) {
            return Err(DomainError::Repository("database is locked".to_string()));
        }
        let mut rows = self.usage.write().await;
        if rows
            .iter()
            .any(|u| u.key() == usage.key() && u.usage_date() == usage.usage_date())
        {
            return Err(DomainError::ConstraintViolation(format!(
                "UNIQUE constraint failed: nft_usage ({})",
                usage.key()
            )));
        }
        rows.push(usage.clone());
        Ok(())
    }

    async fn find_used_on(
        &self,
        keys: &[NftKey],
        date: chrono::NaiveDate,
    ) -> Result<Vec<NftKey>, DomainError> {
        if self.stale_lookups {
            return Ok(Vec::new());
        }
        let rows = self.usage.read().await;
        Ok(keys
            .iter()
            .filter(|k| rows.iter().any(|u| u.key() == *k && u.usage_date() == date))
            .cloned()
            .collect())
    }

    async fn find_by_check_in(&self, check_in_id: &CheckInId) -> Result<Vec<NftUsage>, DomainError> {
        let rows = self.usage.read().await;
        Ok(rows
            .iter()
            .filter(|u| u.check_in_id() == check_in_id)
            .cloned()
            .collect())
    }
}

/// Settable clock shared between the test and the handler
#[derive(Clone)]
struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    fn at(start: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }

    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }

    fn as_clock(&self) -> Clock {
        let inner = self.0.clone();
        Arc::new(move || *inner.lock().unwrap())
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

fn nft(contract: &str, token: &str, points: f64) -> EligibleNft {
    EligibleNft {
        token_id: token.to_string(),
        contract_address: contract.to_string(),
        points: Some(points),
    }
}

fn resolver_returning(points: NftPoints) -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(move |_| Ok(points.clone()));
    resolver
}

fn flat_points(total: f64) -> NftPoints {
    NftPoints {
        total_points: total,
        eligible_nfts: vec![],
    }
}

struct Harness {
    handler: ExecuteCheckInCommandHandler,
    users: Arc<MockUserRepository>,
    check_ins: Arc<MockCheckInRepository>,
    usage: Arc<MockNftUsageRepository>,
    clock: TestClock,
}

fn harness_with(
    resolver: MockResolver,
    users: MockUserRepository,
    check_ins: MockCheckInRepository,
    usage: MockNftUsageRepository,
) -> Harness {
    let users = Arc::new(users);
    let check_ins = Arc::new(check_ins);
    let usage = Arc::new(usage);
    let clock = TestClock::at(start_time());

    let nft_points = Arc::new(NftPointsService::new(Arc::new(resolver), usage.clone()));
    let handler = ExecuteCheckInCommandHandler::new(users.clone(), check_ins.clone(), nft_points)
        .with_clock(clock.as_clock());

    Harness {
        handler,
        users,
        check_ins,
        usage,
        clock,
    }
}

fn harness(resolver: MockResolver) -> Harness {
    harness_with(
        resolver,
        MockUserRepository::new(),
        MockCheckInRepository::new(),
        MockNftUsageRepository::new(),
    )
}

fn command(wallet: &str) -> ExecuteCheckInCommand {
    ExecuteCheckInCommand {
        wallet_address: wallet.to_string(),
        transaction_hash: None,
    }
}

fn completed(outcome: CheckInOutcome) -> CheckInReceipt {
    match outcome {
        CheckInOutcome::Completed(receipt) => receipt,
        other => panic!("Expected completed check-in, got {:?}", other),
    }
}

// Tests

#[tokio::test]
async fn test_first_check_in_creates_user() {
    let h = harness(resolver_returning(flat_points(100.0)));

    let receipt = completed(h.handler.handle(command("0xABC")).await.unwrap());

    assert_eq!(receipt.user.wallet_address().as_str(), "0xabc");
    assert_eq!(receipt.user.current_streak(), 1);
    assert_eq!(receipt.user.max_streak(), 1);
    assert_eq!(receipt.user.total_check_ins(), 1);
    assert_eq!(receipt.user.total_points(), 100.0);
    assert_eq!(receipt.multiplier, Multiplier::Standard);
    assert_eq!(receipt.points_earned, 100.0);
    assert_eq!(receipt.check_in.streak_count(), 1);
    assert_eq!(receipt.check_in.user_id(), receipt.user.id());

    let stored = h.users.get("0xabc").await.unwrap();
    assert_eq!(stored.total_points(), 100.0);
    assert_eq!(stored.last_check_in(), start_time());
    assert_eq!(h.check_ins.count().await, 1);
}

#[tokio::test]
async fn test_same_day_repeat_is_rejected_without_changes() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .times(1)
        .returning(|_| Ok(flat_points(100.0)));
    let h = harness(resolver);

    completed(h.handler.handle(command("0xabc")).await.unwrap());
    h.clock.advance(Duration::hours(23) + Duration::minutes(59));

    match h.handler.handle(command("0xABC")).await.unwrap() {
        CheckInOutcome::Rejected {
            user,
            last_check_in,
            next_eligible_at,
        } => {
            assert_eq!(user.total_check_ins(), 1);
            assert_eq!(user.total_points(), 100.0);
            assert_eq!(last_check_in, start_time());
            assert_eq!(next_eligible_at, start_time() + Duration::days(1));
        }
        other => panic!("Expected rejection, got {:?}", other),
    }

    assert_eq!(h.check_ins.count().await, 1);
    assert_eq!(h.users.get("0xabc").await.unwrap().total_check_ins(), 1);
}

#[tokio::test]
async fn test_next_day_continues_and_gap_resets_streak() {
    let h = harness(resolver_returning(flat_points(10.0)));

    completed(h.handler.handle(command("0xabc")).await.unwrap());
    h.clock.advance(Duration::days(1));
    let day_two = completed(h.handler.handle(command("0xabc")).await.unwrap());
    assert_eq!(day_two.user.current_streak(), 2);
    assert_eq!(day_two.user.max_streak(), 2);

    h.clock.advance(Duration::days(3));
    let after_gap = completed(h.handler.handle(command("0xabc")).await.unwrap());
    assert_eq!(after_gap.user.current_streak(), 1);
    assert_eq!(after_gap.user.max_streak(), 2);
    assert_eq!(after_gap.user.total_check_ins(), 3);
    assert_eq!(after_gap.user.total_points(), 30.0);
}

#[tokio::test]
async fn test_streak_of_eight_earns_one_and_a_half() {
    let h = harness(resolver_returning(flat_points(100.0)));

    let mut last = None;
    for day in 0..8 {
        if day > 0 {
            h.clock.advance(Duration::days(1));
        }
        last = Some(completed(h.handler.handle(command("0xABC")).await.unwrap()));
    }

    let receipt = last.unwrap();
    assert_eq!(receipt.user.current_streak(), 8);
    assert_eq!(receipt.multiplier, Multiplier::OneAndHalf);
    assert_eq!(receipt.points_earned, 150.0);
    assert_eq!(receipt.user.total_points(), 7.0 * 100.0 + 150.0);
}

#[tokio::test]
async fn test_missing_wallet_is_validation_error() {
    let mut resolver = MockResolver::new();
    resolver.expect_resolve().times(0);
    let h = harness(resolver);

    for raw in ["", "   "] {
        match h.handler.handle(command(raw)).await {
            Err(DomainError::Validation(msg)) => assert_eq!(msg, "Wallet address is required"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
    assert_eq!(h.check_ins.count().await, 0);
}

#[tokio::test]
async fn test_transaction_hash_is_kept() {
    let h = harness(resolver_returning(flat_points(0.0)));

    let receipt = completed(
        h.handler
            .handle(ExecuteCheckInCommand {
                wallet_address: "0xabc".to_string(),
                transaction_hash: Some("0xfeed".to_string()),
            })
            .await
            .unwrap(),
    );

    assert_eq!(receipt.check_in.transaction_hash(), Some("0xfeed"));
    assert_eq!(receipt.points_earned, 0.0);
}

#[tokio::test]
async fn test_resolver_failure_aborts_after_streak_update() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_| Err(DomainError::ExternalService("resolver timed out".to_string())));
    let h = harness(resolver);

    let result = h.handler.handle(command("0xabc")).await;
    assert!(matches!(result, Err(DomainError::ExternalService(_))));

    // Earlier writes are not rolled back
    let user = h.users.get("0xabc").await.unwrap();
    assert_eq!(user.total_check_ins(), 1);
    assert_eq!(user.total_points(), 0.0);
    assert_eq!(h.check_ins.count().await, 0);
}

#[tokio::test]
async fn test_check_in_save_failure_is_an_error() {
    let h = harness_with(
        resolver_returning(flat_points(50.0)),
        MockUserRepository::new(),
        MockCheckInRepository::failing(),
        MockNftUsageRepository::new(),
    );

    let result = h.handler.handle(command("0xabc")).await;
    assert!(matches!(result, Err(DomainError::Repository(_))));
    assert_eq!(h.users.get("0xabc").await.unwrap().total_points(), 0.0);
    assert_eq!(h.usage.count().await, 0);
}

#[tokio::test]
async fn test_nft_usage_is_recorded_per_nft() {
    let points = NftPoints {
        total_points: 30.0,
        eligible_nfts: vec![nft("0xNFT", "1", 10.0), nft("0xNFT", "2", 20.0)],
    };
    let h = harness(resolver_returning(points));

    let receipt = completed(h.handler.handle(command("0xabc")).await.unwrap());

    assert_eq!(receipt.points_earned, 30.0);
    assert_eq!(
        receipt.nft_usage.recorded,
        vec![NftKey::new("0xnft", "1"), NftKey::new("0xnft", "2")]
    );
    assert!(receipt.nft_usage.is_complete());

    let usage = h.usage.find_by_check_in(receipt.check_in.id()).await.unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[0].wallet_address().as_str(), "0xabc");
}

#[tokio::test]
async fn test_nfts_used_today_are_excluded_from_points() {
    let points = NftPoints {
        total_points: 30.0,
        eligible_nfts: vec![nft("0xnft", "1", 10.0), nft("0xnft", "2", 20.0)],
    };
    let usage = MockNftUsageRepository::new();
    usage
        .seed(NftKey::new("0xnft", "2"), "0xother", start_time() - Duration::hours(1))
        .await;
    let h = harness_with(
        resolver_returning(points),
        MockUserRepository::new(),
        MockCheckInRepository::new(),
        usage,
    );

    let receipt = completed(h.handler.handle(command("0xabc")).await.unwrap());

    assert_eq!(receipt.points_earned, 10.0);
    assert_eq!(receipt.nft_usage.recorded, vec![NftKey::new("0xnft", "1")]);
    assert!(receipt.nft_usage.already_used.is_empty());
}

#[tokio::test]
async fn test_nft_claimed_concurrently_is_reported_not_fatal() {
    let points = NftPoints {
        total_points: 10.0,
        eligible_nfts: vec![nft("0xnft", "7", 10.0)],
    };
    let mut usage = MockNftUsageRepository::new();
    usage.stale_lookups = true;
    usage
        .seed(NftKey::new("0xnft", "7"), "0xother", start_time())
        .await;
    let h = harness_with(
        resolver_returning(points),
        MockUserRepository::new(),
        MockCheckInRepository::new(),
        usage,
    );

    let receipt = completed(h.handler.handle(command("0xabc")).await.unwrap());

    assert_eq!(receipt.nft_usage.already_used, vec![NftKey::new("0xnft", "7")]);
    assert!(receipt.nft_usage.recorded.is_empty());
    assert!(!receipt.nft_usage.is_complete());
    assert_eq!(receipt.user.total_check_ins(), 1);
}

#[tokio::test]
async fn test_nft_usage_store_errors_are_reported() {
    let points = NftPoints {
        total_points: 20.0,
        eligible_nfts: vec![nft("0xnft", "1", 10.0), nft("0xnft", "2", 10.0)],
    };
    let mut usage = MockNftUsageRepository::new();
    usage.broken_key = Some(NftKey::new("0xnft", "2"));
    let h = harness_with(
        resolver_returning(points),
        MockUserRepository::new(),
        MockCheckInRepository::new(),
        usage,
    );

    let receipt = completed(h.handler.handle(command("0xabc")).await.unwrap());

    assert_eq!(receipt.nft_usage.recorded, vec![NftKey::new("0xnft", "1")]);
    assert_eq!(receipt.nft_usage.failed.len(), 1);
    assert_eq!(receipt.nft_usage.failed[0].nft, NftKey::new("0xnft", "2"));
    assert!(receipt.nft_usage.failed[0].error.contains("database is locked"));
    assert_eq!(receipt.user.total_points(), 20.0);
}

#[tokio::test]
async fn test_lost_update_race_becomes_rejection() {
    let h = harness(resolver_returning(flat_points(5.0)));
    completed(h.handler.handle(command("0xabc")).await.unwrap());

    h.clock.advance(Duration::days(1));

    // Another request checks in first, between our read and our write
    let mut winner = h.users.get("0xabc").await.unwrap();
    let advance = match loyalty_domain::check_in::CheckInEngine::decide(Some(&winner), h.clock.now()) {
        loyalty_domain::check_in::CheckInDecision::Accepted(advance) => advance,
        other => panic!("unexpected {:?}", other),
    };
    winner.apply(&advance);
    *h.users.concurrent_update.lock().unwrap() = Some(winner);

    match h.handler.handle(command("0xabc")).await.unwrap() {
        CheckInOutcome::Rejected { user, .. } => {
            assert_eq!(user.total_check_ins(), 2);
            assert_eq!(user.current_streak(), 2);
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
    assert_eq!(h.check_ins.count().await, 1);
}

#[tokio::test]
async fn test_duplicate_first_check_in_becomes_rejection() {
    let h = harness(resolver_returning(flat_points(5.0)));

    let advance = match loyalty_domain::check_in::CheckInEngine::decide(None, h.clock.now()) {
        loyalty_domain::check_in::CheckInDecision::Accepted(advance) => advance,
        other => panic!("unexpected {:?}", other),
    };
    let winner =
        LoyaltyUser::first_check_in(WalletAddress::parse("0xabc").unwrap(), &advance).unwrap();
    *h.users.concurrent_create.lock().unwrap() = Some(winner.clone());

    match h.handler.handle(command("0xABC")).await.unwrap() {
        CheckInOutcome::Rejected { user, .. } => assert_eq!(user.id(), winner.id()),
        other => panic!("Expected rejection, got {:?}", other),
    }
    assert_eq!(h.check_ins.count().await, 0);
}

#[tokio::test]
async fn test_unpriced_nfts_still_earn_after_one_is_used_today() {
    let points = NftPoints {
        total_points: 100.0,
        eligible_nfts: vec![
            EligibleNft {
                token_id: "1".to_string(),
                contract_address: "0xnft".to_string(),
                points: None,
            },
            EligibleNft {
                token_id: "2".to_string(),
                contract_address: "0xnft".to_string(),
                points: None,
            },
        ],
    };
    let usage = MockNftUsageRepository::new();
    usage
        .seed(NftKey::new("0xnft", "1"), "0xother", start_time() - Duration::hours(2))
        .await;
    let h = harness_with(
        resolver_returning(points),
        MockUserRepository::new(),
        MockCheckInRepository::new(),
        usage,
    );

    let receipt = completed(h.handler.handle(command("0xabc")).await.unwrap());

    assert_eq!(receipt.points_earned, 50.0);
    assert_eq!(receipt.nft_usage.recorded, vec![NftKey::new("0xnft", "2")]);
}
