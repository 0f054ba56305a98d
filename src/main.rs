//! SYD Cyber console - drives the risk assessment flow from a terminal.
//!
//! Free text goes to the chat input handler; lines starting with `/` are
//! commands for the collaborator flows:
//!
//! - `/ateco <code>` - ATECO analysis
//! - `/batch <codes>` - batch lookup (comma, semicolon or newline separated)
//! - `/pdf` - send the pre-report
//! - `/feedback <six ratings 1-5> [comment]` - submit the survey
//! - `/reset`, `/quit`

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use syd_cyber::adapters::{
    FileFlagStore, HttpBackendClient, MockBackend, NullEnricher, TracingNotifier,
};
use syd_cyber::application::{
    AtecoService, FeedbackService, ReportService, RiskFlowEngine, Tracking,
};
use syd_cyber::config::{AppConfig, LogFormat, LoggingConfig};
use syd_cyber::domain::chat::{ChatMessage, ChatStore, MessagePayload, Sender};
use syd_cyber::domain::feedback::FeedbackDraft;
use syd_cyber::domain::session::SessionStore;
use syd_cyber::ports::{
    AtecoDirectory, AtecoEnricher, EventTracker, FeedbackSink, Notifier, ReportSender,
    RiskBackend, TrackingContext,
};

struct Console {
    engine: RiskFlowEngine,
    ateco: AtecoService,
    reports: ReportService,
    feedback: FeedbackService,
    tracking: Tracking,
    rendered: usize,
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let mut console = if config.backend.offline {
        info!("Running offline against the sample catalog");
        let backend = Arc::new(MockBackend::with_sample_catalog());
        build(&config, backend.clone(), backend)
    } else {
        match HttpBackendClient::new(config.backend.http_config()) {
            Ok(client) => {
                info!(base_url = %config.backend.base_url, "Using HTTP backend");
                build(&config, Arc::new(client), Arc::new(NullEnricher))
            }
            Err(e) => {
                error!("Backend client error: {}", e);
                std::process::exit(1);
            }
        }
    };

    println!("SYD Cyber - scrivi \"rischi\" per iniziare una valutazione, /quit per uscire.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        console.handle(line).await;
        console.render_new();
    }

    console.tracking.flush().await;
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn build<B>(config: &AppConfig, backend: Arc<B>, enricher: Arc<dyn AtecoEnricher>) -> Console
where
    B: RiskBackend + AtecoDirectory + EventTracker + FeedbackSink + ReportSender + 'static,
{
    let chat = Arc::new(ChatStore::new());
    let session = Arc::new(SessionStore::new());
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let context = TrackingContext::anonymous();
    let tracking = if config.tracking.enabled {
        Tracking::new(backend.clone(), context.clone())
    } else {
        Tracking::disabled()
    };

    let engine = RiskFlowEngine::new(backend.clone(), chat.clone(), notifier.clone())
        .with_settings(config.flow.flow_settings())
        .with_tracking(tracking.clone());
    let ateco = AtecoService::new(
        backend.clone(),
        enricher,
        chat.clone(),
        session.clone(),
        notifier.clone(),
    )
    .with_settings(config.flow.ateco_settings());
    let reports = ReportService::new(backend.clone(), chat, session, notifier.clone())
        .with_tracking(tracking.clone())
        .with_timeout(config.flow.operation_timeout());
    let feedback = FeedbackService::new(
        backend,
        Arc::new(FileFlagStore::new(&config.storage.flags_path)),
        notifier,
        context,
    )
    .with_timeout(config.flow.operation_timeout());

    Console {
        engine,
        ateco,
        reports,
        feedback,
        tracking,
        rendered: 0,
    }
}

impl Console {
    async fn handle(&self, line: &str) {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let result = match command {
            "/ateco" => self.ateco.lookup(rest).await.map(|_| ()),
            "/batch" => self.ateco.import_codes(rest).await.map(|_| ()),
            "/pdf" => self.reports.send_prereport().await.map(|_| ()),
            "/feedback" => self.submit_feedback(rest).await,
            "/reset" => {
                self.engine.reset();
                Ok(())
            }
            _ => self.engine.handle_user_input(line).await,
        };
        if let Err(e) = result {
            warn!(error = %e, input = %line, "Command failed");
        }
    }

    async fn submit_feedback(
        &self,
        args: &str,
    ) -> Result<(), syd_cyber::application::RiskFlowError> {
        if self.feedback.has_submitted().await {
            println!("Feedback già inviato, grazie!");
            return Ok(());
        }
        let mut parts = args.split_whitespace();
        let ratings: Vec<Option<u8>> = (0..6)
            .map(|_| parts.next().and_then(|v| v.parse::<u8>().ok()))
            .collect();
        let draft = FeedbackDraft {
            impression_ui: ratings[0],
            impression_utility: ratings[1],
            ease_of_use: ratings[2],
            innovation: ratings[3],
            syd_helpfulness: ratings[4],
            assessment_clarity: ratings[5],
            liked_most: parts.collect::<Vec<_>>().join(" "),
            improvements: String::new(),
        };
        self.feedback.submit(&draft, None).await.map(|_| ())
    }

    fn render_new(&mut self) {
        let state = self.engine.state();
        for message in state.messages().iter().skip(self.rendered) {
            print_message(message);
        }
        self.rendered = state.messages().len();
    }
}

fn print_message(message: &ChatMessage) {
    let prefix = match message.sender() {
        Sender::User => return,
        Sender::Agent => "SYD>",
    };
    match message.payload() {
        MessagePayload::Text { text } | MessagePayload::ControlDescription { text } => {
            println!("{} {}", prefix, text)
        }
        MessagePayload::Error { text } => println!("{} ⚠ {}", prefix, text),
        MessagePayload::RiskCategories { categories } => {
            println!("{} Scegli una categoria di rischio:", prefix);
            for category in categories {
                println!("   [{}] {} - {}", category.id, category.display_name, category.description);
            }
        }
        MessagePayload::RiskEvents { category, events } => {
            println!("{} Eventi per {}:", prefix, category);
            for (i, event) in events.iter().enumerate() {
                println!("   {:>2}. {} {}", i + 1, event.code, event.name);
            }
        }
        MessagePayload::RiskDescription { description } => {
            println!("{} {} - {}", prefix, description.code, description.name);
            println!("   {}", description.description);
            println!("   Probabilità: {}  Impatto: {}", description.probability, description.impact);
            println!("   Confermi questo evento? (si / no)");
        }
        MessagePayload::AssessmentQuestion { question, total, field } => {
            println!("{} Domanda {}/{}: {}", prefix, question, total, field.question);
            for (i, option) in field.options.iter().enumerate() {
                println!("   {}. {}", i + 1, option.label);
            }
        }
        MessagePayload::AssessmentComplete { event_code, outcome, .. } => {
            println!(
                "{} Valutazione {} completata: punteggio {} ({})",
                prefix, event_code, outcome.risk_score, outcome.analysis
            );
            println!("   Scrivi \"report\" per archiviarla.");
        }
        MessagePayload::ReportReady { report } => {
            println!("{} Report {} archiviato. Usa /pdf per riceverlo.", prefix, report.event_code)
        }
        MessagePayload::AtecoResponse { report } => {
            println!("{} {}", prefix, report.headline());
            println!("   {}: {}", report.lookup.codice_2025, report.lookup.titolo_2025);
            println!("   {}", report.arricchimento);
            if !report.normative.is_empty() {
                println!("   Normative: {}", report.normative.join(", "));
            }
            if !report.certificazioni.is_empty() {
                println!("   Certificazioni: {}", report.certificazioni.join(", "));
            }
        }
    }
}
