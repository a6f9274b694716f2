use portfolio_advisor::{
    chart::{chart_view, ChartView},
    config::AdvisorConfig,
    dashboard,
    knowledge::{self, Feature},
    session::SessionController,
    storage::{build_store, AccessGate},
    transcript::Transcript,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HELP: &str = "Commands: /suggest, /feature <name>, /chart <conservative|moderate|aggressive>, \
/dashboard, /login <name>, /logout, /history, /help, /quit";

fn print_chart(view: &ChartView) {
    match view {
        ChartView::Available { title, slices } => {
            println!("\n  ── {} ──", title);
            for slice in slices {
                let bar = "█".repeat((slice.value as usize).div_ceil(2));
                println!("  {:<24} {:<33} {:>3}%", slice.name, bar, slice.value);
            }
            println!();
        }
        ChartView::NotAvailable { message } => println!("\n  {}\n", message),
    }
}

async fn print_dashboard(gate: &AccessGate) {
    if !gate.is_authenticated().await {
        println!("Please /login to view your dashboard.");
        return;
    }

    let overview = dashboard::portfolio_overview();
    println!("\nPortfolio value: ${:.2} ({:+.1}% today)", overview.total_value, overview.day_change);
    for (holding, (_, weight)) in overview.holdings.iter().zip(overview.weights()) {
        println!(
            "  {:<8} ${:>10.2}  {:>5.1}%  ({:+.1}% today)",
            holding.name, holding.value, weight, holding.day_change
        );
    }

    let investments = dashboard::investments_overview();
    println!("\nRecommended investments:");
    for inv in &investments.recommended {
        println!(
            "  {:<24} {:<13} {:<7} 1Y {:+.1}%  5Y {:+.1}%",
            inv.name, inv.category, inv.risk, inv.one_year_return, inv.five_year_return
        );
    }
    println!();
}

fn print_new_messages(transcript: &Transcript, printed: &mut usize) {
    for message in transcript.messages().iter().skip(*printed) {
        if message.role == portfolio_advisor::Role::Assistant {
            println!("Advisor: {}\n", message.content);
        }
    }
    *printed = transcript.len();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Keep the terminal quiet unless asked
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = AdvisorConfig::from_env()?;
    let gate = AccessGate::new(build_store(config.session_file.clone()));
    let controller = SessionController::new(config.typing.clone());

    info!("Portfolio Advisor starting");
    println!("=== Investment Portfolio Advisor ===");
    println!("{}\n", HELP);

    controller.open()?;

    // Wait for the opening greeting
    let mut printed = 0;
    loop {
        let snapshot = controller.snapshot().await;
        if !snapshot.messages.is_empty() {
            let mut transcript = Transcript::new();
            snapshot.messages.into_iter().for_each(|m| transcript.push(m));
            print_new_messages(&transcript, &mut printed);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (command, arg) = match input.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        let message = match command {
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{}", HELP);
                continue;
            }
            "/suggest" => {
                for question in knowledge::SUGGESTED_QUESTIONS {
                    println!("  • {}", question);
                }
                continue;
            }
            "/feature" => match Feature::parse(arg) {
                Some(feature) => {
                    let question = knowledge::random_feature_question(feature, &mut rand::thread_rng());
                    println!("You: {}", question);
                    question.to_string()
                }
                None => {
                    let names: Vec<&str> = Feature::ALL.iter().map(|f| f.key()).collect();
                    println!("Features: {}", names.join(", "));
                    continue;
                }
            },
            "/chart" => {
                print_chart(&chart_view(arg));
                continue;
            }
            "/dashboard" => {
                print_dashboard(&gate).await;
                continue;
            }
            "/login" => {
                match gate.login(arg).await {
                    Ok(()) => println!("Signed in as {}.", arg),
                    Err(e) => println!("Sign-in failed: {}", e),
                }
                continue;
            }
            "/logout" => {
                gate.logout().await?;
                println!("Signed out.");
                continue;
            }
            "/history" => {
                let snapshot = controller.snapshot().await;
                let mut transcript = Transcript::new();
                snapshot.messages.into_iter().for_each(|m| transcript.push(m));
                print!("{}", transcript.render());
                continue;
            }
            _ => input.to_string(),
        };

        println!("Advisor is typing...");
        match controller.submit_and_wait(&message).await {
            Ok(outcome) => {
                println!("Advisor: {}\n", outcome.reply.content);
                if let Some(view) = &outcome.chart_view {
                    println!("Portfolio Visualization available:");
                    print_chart(view);
                }
            }
            Err(e) => println!("Could not send message: {}", e),
        }
        printed = controller.snapshot().await.messages.len();
    }

    controller.close().await;
    info!(messages = printed, "Portfolio Advisor exiting");
    Ok(())
}
