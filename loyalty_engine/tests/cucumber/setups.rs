use cucumber::given;
use loyalty_engine::{db_types::UserId, test_utils::ScriptedOracle};

use crate::cucumber::{world::LoyaltySystem, LoyaltyWorld};

#[given("a fresh install")]
async fn fresh_install(world: &mut LoyaltyWorld) {
    let system = LoyaltySystem::new(ScriptedOracle::default()).await;
    world.system = Some(system);
}

#[given(expr = "a fresh install where the accrual service is unreachable and allows {int} attempts")]
async fn fresh_install_unreachable(world: &mut LoyaltyWorld, attempts: u32) {
    let oracle = ScriptedOracle::unreachable().with_max_attempts(attempts);
    world.system = Some(LoyaltySystem::new(oracle).await);
}

#[given(expr = "user {int} has an account")]
async fn open_account(world: &mut LoyaltyWorld, user: i64) {
    world.system().balances.open_account(UserId(user)).await.expect("Error opening account");
}
