//! Cancellable scrape→classify pipeline with at-most-one in-flight task.
//!
//! `start` supersedes any running task: the previous cancellation token is triggered before a
//! fresh one is minted, and a generation counter suppresses publishes from superseded tasks
//! so a stale completion can never clobber its successor's state. Both network steps are
//! bound to the same token; cancelling aborts whichever is in flight and prevents the other
//! from starting. The spawned task holds only a weak controller reference—once the embedder
//! drops the controller, no further state updates are possible.

// std
use std::sync::{
	Weak,
	atomic::{AtomicU64, Ordering},
};
// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	api::{ClassifyRequest, ScrapeRequest, ScrapeResponse, TenderGateway},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
	tender::{ClassifiedTender, Tender},
};

/// Lifecycle of the current (or most recent) pipeline task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskStatus {
	/// No task has run yet.
	#[default]
	Idle,
	/// Scrape step in flight.
	Scraping,
	/// Scrape results received; classify step in flight.
	Classifying,
	/// Both steps completed.
	Completed,
	/// The task was aborted by an explicit stop or a superseding start.
	Cancelled,
	/// A step failed; see the snapshot message.
	Failed,
}
impl TaskStatus {
	/// Returns `true` while either network step is in flight.
	pub fn is_loading(self) -> bool {
		matches!(self, Self::Scraping | Self::Classifying)
	}
}

/// State published by the pipeline after every transition.
#[derive(Clone, Debug, Default)]
pub struct TaskSnapshot {
	/// Task lifecycle stage.
	pub status: TaskStatus,
	/// Raw scrape results; populated once the scrape step completes.
	pub raw: Vec<Tender>,
	/// Classified results; populated once the classify step completes.
	pub classified: Vec<ClassifiedTender>,
	/// User-facing message (server summary, cancellation notice, or error).
	pub message: Option<String>,
}
impl TaskSnapshot {
	/// Returns `true` while either network step is in flight.
	pub fn is_loading(&self) -> bool {
		self.status.is_loading()
	}
}

struct ActiveTask {
	generation: u64,
	cancel: CancellationToken,
}

/// Runs the scrape→classify pipeline as one cancellable unit.
pub struct PipelineController<G>
where
	G: ?Sized + TenderGateway,
{
	gateway: Arc<G>,
	store: Arc<dyn CredentialStore>,
	state: watch::Sender<TaskSnapshot>,
	active: Mutex<Option<ActiveTask>>,
	generation: AtomicU64,
}
impl<G> PipelineController<G>
where
	G: ?Sized + TenderGateway + 'static,
{
	/// Creates a controller over the provided gateway and credential store.
	pub fn new(gateway: impl Into<Arc<G>>, store: Arc<dyn CredentialStore>) -> Arc<Self> {
		let (state, _) = watch::channel(TaskSnapshot::default());

		Arc::new(Self {
			gateway: gateway.into(),
			store,
			state,
			active: Mutex::new(None),
			generation: AtomicU64::new(0),
		})
	}

	/// Subscribes to task state; the receiver sees every published snapshot.
	pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
		self.state.subscribe()
	}

	/// Snapshots the current task state.
	pub fn snapshot(&self) -> TaskSnapshot {
		self.state.borrow().clone()
	}

	/// Starts a scrape→classify task, cancelling any task still in flight.
	pub fn start(self: &Arc<Self>, keywords: Vec<String>) {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let cancel = CancellationToken::new();
		let mut active = self.active.lock();

		if let Some(previous) = active.take() {
			previous.cancel.cancel();
		}

		self.state.send_replace(TaskSnapshot {
			status: TaskStatus::Scraping,
			..Default::default()
		});

		let this = Arc::downgrade(self);

		tokio::spawn(Self::run(this, generation, keywords, cancel.clone()));

		*active = Some(ActiveTask { generation, cancel });
	}

	/// Cancels the task currently in flight, if any.
	pub fn stop(&self) {
		if let Some(active) = self.active.lock().as_ref() {
			active.cancel.cancel();
		}
	}

	async fn run(
		this: Weak<Self>,
		generation: u64,
		keywords: Vec<String>,
		cancel: CancellationToken,
	) {
		let Some(controller) = this.upgrade() else { return };
		let gateway = Arc::clone(&controller.gateway);
		let store = Arc::clone(&controller.store);

		drop(controller);

		match Self::execute(&this, generation, gateway.as_ref(), &keywords, &cancel).await {
			Ok((scraped, classified)) => Self::publish(&this, generation, TaskSnapshot {
				status: TaskStatus::Completed,
				message: scraped.message,
				raw: scraped.results,
				classified,
			}),
			Err(err) if err.is_cancelled() => Self::publish(&this, generation, TaskSnapshot {
				status: TaskStatus::Cancelled,
				message: Some(err.to_string()),
				..Default::default()
			}),
			Err(err) => {
				if err.is_session_fatal() {
					// A 401 invalidates the whole session, not just this task.
					let _ = store.clear().await;
				}

				Self::publish(&this, generation, TaskSnapshot {
					status: TaskStatus::Failed,
					message: Some(err.to_string()),
					..Default::default()
				});
			},
		}

		if let Some(controller) = this.upgrade() {
			let mut active = controller.active.lock();

			if active.as_ref().is_some_and(|task| task.generation == generation) {
				*active = None;
			}
		}
	}

	async fn execute(
		this: &Weak<Self>,
		generation: u64,
		gateway: &G,
		keywords: &[String],
		cancel: &CancellationToken,
	) -> Result<(ScrapeResponse, Vec<ClassifiedTender>)> {
		const SCRAPE: FlowKind = FlowKind::Scrape;
		const CLASSIFY: FlowKind = FlowKind::Classify;

		let span = FlowSpan::new(SCRAPE, "pipeline");

		obs::record_flow_outcome(SCRAPE, FlowOutcome::Attempt);

		let request = ScrapeRequest { keywords: keywords.to_vec() };
		let scraped = span.instrument(gateway.scrape(&request, cancel.clone())).await;

		match &scraped {
			Ok(_) => obs::record_flow_outcome(SCRAPE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(SCRAPE, FlowOutcome::Failure),
		}

		let scraped = scraped?;

		Self::publish(this, generation, TaskSnapshot {
			status: TaskStatus::Classifying,
			raw: scraped.results.clone(),
			..Default::default()
		});

		let span = FlowSpan::new(CLASSIFY, "pipeline");

		obs::record_flow_outcome(CLASSIFY, FlowOutcome::Attempt);

		// Classify consumes the scrape step's titles; it can never start first.
		let request = ClassifyRequest {
			tenders: scraped.results.iter().map(|tender| tender.title.clone()).collect(),
			keywords: keywords.to_vec(),
		};
		let classified = span.instrument(gateway.classify(&request, cancel.clone())).await;

		match &classified {
			Ok(_) => obs::record_flow_outcome(CLASSIFY, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(CLASSIFY, FlowOutcome::Failure),
		}

		Ok((scraped, classified?))
	}

	fn publish(this: &Weak<Self>, generation: u64, snapshot: TaskSnapshot) {
		let Some(controller) = this.upgrade() else { return };
		// Serialized with `start`, which publishes the successor's first snapshot under the
		// same lock; a superseded task can therefore never interleave past the check.
		let _serialize = controller.active.lock();

		if controller.generation.load(Ordering::SeqCst) == generation {
			controller.state.send_replace(snapshot);
		}
	}
}
impl<G> Drop for PipelineController<G>
where
	G: ?Sized + TenderGateway,
{
	fn drop(&mut self) {
		if let Some(active) = self.active.lock().take() {
			active.cancel.cancel();
		}
	}
}
impl<G> Debug for PipelineController<G>
where
	G: ?Sized + TenderGateway,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PipelineController")
			.field("status", &self.state.borrow().status)
			.finish()
	}
}
