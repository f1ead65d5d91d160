use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::application::commands::check_in_commands::*;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::services::NftPointsService;
use loyalty_domain::check_in::{
    CheckInDecision, CheckInEngine, CheckInRecord, CheckInRepository, StreakAdvance,
};
use loyalty_domain::shared::{DomainError, WalletAddress};
use loyalty_domain::user::{LoyaltyUser, UserRepository};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Execute check-in command handler.
///
/// Each store write is its own operation: a failure part-way leaves the
/// earlier writes in place. Nothing is retried.
pub struct ExecuteCheckInCommandHandler {
    user_repo: Arc<dyn UserRepository>,
    check_in_repo: Arc<dyn CheckInRepository>,
    nft_points: Arc<NftPointsService>,
    clock: Clock,
}

impl ExecuteCheckInCommandHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        check_in_repo: Arc<dyn CheckInRepository>,
        nft_points: Arc<NftPointsService>,
    ) -> Self {
        Self {
            user_repo,
            check_in_repo,
            nft_points,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Persist the streak change. `None` means a concurrent request got there first.
    async fn persist_streak(
        &self,
        wallet: &WalletAddress,
        prior: Option<LoyaltyUser>,
        advance: &StreakAdvance,
    ) -> Result<Option<LoyaltyUser>, DomainError> {
        match prior {
            None => {
                let user = LoyaltyUser::first_check_in(wallet.clone(), advance)?;
                match self.user_repo.create(&user).await {
                    Ok(()) => Ok(Some(user)),
                    Err(e) if e.is_constraint_violation() => {
                        warn!("[check-in] Concurrent first check-in for {}", wallet);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
            Some(mut user) => {
                let expected_total_check_ins = user.total_check_ins();
                user.apply(advance);
                if self
                    .user_repo
                    .record_check_in(&user, expected_total_check_ins)
                    .await?
                {
                    Ok(Some(user))
                } else {
                    warn!("[check-in] Concurrent check-in for {} won the update", wallet);
                    Ok(None)
                }
            }
        }
    }

    /// Re-read after losing a race and report the winner's check-in as a rejection
    async fn rejection_after_race(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DomainError> {
        let current = self.user_repo.find_by_wallet(wallet).await?.ok_or_else(|| {
            DomainError::DataIntegrity(format!("User {} vanished after a conflicting write", wallet))
        })?;

        match CheckInEngine::decide(Some(&current), now) {
            CheckInDecision::AlreadyCheckedInToday {
                last_check_in,
                next_eligible_at,
            } => Ok(CheckInOutcome::Rejected {
                user: current,
                last_check_in,
                next_eligible_at,
            }),
            CheckInDecision::Accepted(_) => Err(DomainError::CheckInFailed(format!(
                "Check-in for {} lost a concurrent update",
                wallet
            ))),
        }
    }
}

#[async_trait]
impl CommandHandler<ExecuteCheckInCommand> for ExecuteCheckInCommandHandler {
    type Result = CheckInOutcome;

    async fn handle(&self, cmd: ExecuteCheckInCommand) -> Result<Self::Result, DomainError> {
        let wallet = WalletAddress::parse(&cmd.wallet_address)?;
        let now = (self.clock)();

        info!("[check-in] Handling check-in for {}", wallet);

        let prior = self.user_repo.find_by_wallet(&wallet).await?;

        let advance = match CheckInEngine::decide(prior.as_ref(), now) {
            CheckInDecision::Accepted(advance) => advance,
            CheckInDecision::AlreadyCheckedInToday {
                last_check_in,
                next_eligible_at,
            } => {
                let user = prior.ok_or_else(|| {
                    DomainError::DataIntegrity(format!("Rejected {} without a stored user", wallet))
                })?;
                info!(
                    "[check-in] {} already checked in at {}, next at {}",
                    wallet, last_check_in, next_eligible_at
                );
                return Ok(CheckInOutcome::Rejected {
                    user,
                    last_check_in,
                    next_eligible_at,
                });
            }
        };

        let Some(mut user) = self.persist_streak(&wallet, prior, &advance).await? else {
            return self.rejection_after_race(&wallet, now).await;
        };

        let nft_points = self.nft_points.resolve_available(&wallet, now).await?;
        let award = CheckInEngine::award(user.current_streak(), nft_points.total_points);

        let check_in = CheckInRecord::new(
            user.id().clone(),
            wallet.clone(),
            user.current_streak(),
            &award,
            cmd.transaction_hash,
            now,
        );
        self.check_in_repo.save(&check_in).await?;

        let nft_usage = self
            .nft_points
            .record_usage(&nft_points, &wallet, check_in.id(), now)
            .await;
        if !nft_usage.is_complete() {
            warn!(
                "[check-in] NFT usage for {} partially recorded: {} already used, {} failed",
                wallet,
                nft_usage.already_used.len(),
                nft_usage.failed.len()
            );
        }

        let total_points = self
            .user_repo
            .add_points(&wallet, award.points_earned)
            .await?;
        user.sync_total_points(total_points);

        info!(
            "[check-in] {} streak={} multiplier={} earned={} total={}",
            wallet,
            user.current_streak(),
            award.multiplier.value(),
            award.points_earned,
            total_points
        );

        Ok(CheckInOutcome::Completed(CheckInReceipt {
            user,
            check_in,
            points_earned: award.points_earned,
            multiplier: award.multiplier,
            nft_usage,
        }))
    }
}
