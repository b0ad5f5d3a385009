use std::sync::Arc;

use teloxide::{dispatching::Dispatcher as TgDispatcher, dptree, prelude::*};

use osb_core::{
    config::Config,
    dispatch::Dispatcher,
    domain::UserId,
    onboarding::OnboardingService,
    sales::SalesService,
    scheduler::DailyReportScheduler,
    store::{SalesLedger, UserRegistry},
};

use crate::handlers;
use crate::TelegramNotifier;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<dyn UserRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub onboarding: Arc<OnboardingService>,
    pub sales: Arc<SalesService>,
    pub scheduler: DailyReportScheduler,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    registry: Arc<dyn UserRegistry>,
    ledger: Arc<dyn SalesLedger>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("osb started: @{}", me.username());
    }
    println!("Database: {}", cfg.database_path.display());
    println!(
        "Daily report at {:02}:{:02} UTC to operator {}",
        cfg.report_time.hour, cfg.report_time.minute, cfg.operator_id
    );

    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
    let dispatcher = Arc::new(Dispatcher::new(notifier));
    let operator = UserId(cfg.operator_id);

    let onboarding = Arc::new(OnboardingService::new(
        registry.clone(),
        dispatcher.clone(),
        operator,
    ));
    let sales = Arc::new(SalesService::new(ledger.clone()));

    let scheduler = DailyReportScheduler::new(
        cfg.report_time,
        cfg.currency_symbol.clone(),
        operator,
        ledger,
        dispatcher.clone(),
    );
    scheduler.start().await;

    let state = Arc::new(AppState {
        cfg,
        registry,
        dispatcher,
        onboarding,
        sales,
        scheduler,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    TgDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
