//! State aggregator: the single in-process owner of one user's entities and
//! the derived values computed from them.
//!
//! Mutation → recompute → notify is strictly sequential, so subscribers only
//! ever observe a fully recomputed snapshot. Mutations update the snapshot
//! optimistically and hand the trailing persistence write to the outbox;
//! a failed write never rolls the snapshot back.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::interview::InterviewRecord;
use crate::models::profile::UserProfile;
use crate::models::resume::ResumeAnalysis;
use crate::models::roadmap::{RoadmapProgress, RoadmapStructure};
use crate::progress::badges::{evaluate_newly_earned, BadgeInputs, BadgeSpec, EarnedBadges};
use crate::progress::outbox::{Outbox, SyncState};
use crate::progress::readiness::{completion_fraction, compute_readiness, ReadinessWeights};
use crate::progress::streak::{current_streak, day_key};
use crate::progress::tasks::{flatten_tasks, Task};
use crate::store::{collections, DocumentStore};

/// Everything subscribers see: source entities plus derived values.
/// Derived fields are recomputed from sources on every mutation and are
/// never the source of truth.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub profile: UserProfile,
    /// Whether the profile document was fetched successfully at init.
    pub profile_loaded: bool,
    pub resume: Option<ResumeAnalysis>,
    pub interviews: Vec<InterviewRecord>,
    pub roadmap: RoadmapStructure,
    pub progress: RoadmapProgress,
    pub badges: EarnedBadges,
    /// Derived 0–100 readiness score.
    pub readiness: u32,
    /// Derived flattened task list.
    pub tasks: Vec<Task>,
    /// Derived activity streak in days.
    pub streak: u32,
}

impl Snapshot {
    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Completion over the CURRENT structure's leaves; stale ids in the
    /// completed set contribute nothing here.
    pub fn completion_fraction(&self) -> Option<f64> {
        completion_fraction(self.completed_task_count(), self.tasks.len())
    }
}

pub type SubscriberId = u64;
type Subscriber = Box<dyn Fn(&Snapshot) + Send + Sync>;

pub struct StateAggregator {
    user_id: Uuid,
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
    weights: ReadinessWeights,
    snapshot: Snapshot,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber_id: SubscriberId,
    initialized: bool,
}

impl StateAggregator {
    pub fn new(user_id: Uuid, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            user_id,
            outbox: Outbox::new(Arc::clone(&store), user_id),
            store,
            weights: ReadinessWeights::default(),
            snapshot: Snapshot::default(),
            subscribers: Vec::new(),
            next_subscriber_id: 0,
            initialized: false,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sync_states(&self) -> BTreeMap<String, SyncState> {
        self.outbox.sync_states()
    }

    /// Fetches all entities concurrently and builds the first snapshot.
    ///
    /// Each fetch failure is isolated: the entity falls back to its default
    /// and initialization continues. Returns whether the profile document
    /// was fetched successfully — the caller's "partial success" signal.
    pub async fn initialize(&mut self) -> bool {
        let uid = self.user_id;
        let (profile, resume, roadmap, progress, badges, interviews) = tokio::join!(
            self.store.fetch(uid, collections::PROFILES),
            self.store.fetch(uid, collections::RESUME_ANALYSES),
            self.store.fetch(uid, collections::ROADMAPS),
            self.store.fetch(uid, collections::ROADMAP_PROGRESS),
            self.store.fetch(uid, collections::BADGES),
            self.store.list(uid, collections::INTERVIEWS),
        );

        let (profile, profile_loaded) = decode_entity(profile, collections::PROFILES);
        self.snapshot.profile = profile;
        self.snapshot.profile_loaded = profile_loaded;

        let (resume, resume_present) =
            decode_entity::<ResumeAnalysis>(resume, collections::RESUME_ANALYSES);
        self.snapshot.resume = resume_present.then_some(resume);

        (self.snapshot.roadmap, _) = decode_entity(roadmap, collections::ROADMAPS);
        (self.snapshot.progress, _) = decode_entity(progress, collections::ROADMAP_PROGRESS);
        (self.snapshot.badges, _) = decode_entity(badges, collections::BADGES);

        self.snapshot.interviews = match interviews {
            Ok(docs) => decode_interviews(docs),
            Err(e) => {
                warn!("Fetch of {} failed: {e:#}", collections::INTERVIEWS);
                Vec::new()
            }
        };

        self.initialized = true;
        let newly = self.publish();
        if !newly.is_empty() {
            info!(
                "User {uid} earned {} badge(s) on load",
                newly.len()
            );
        }
        profile_loaded
    }

    /// Registers a subscriber, invoking it once immediately with the
    /// current snapshot.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&Snapshot) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        callback(&self.snapshot);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Flips a task's membership in the completed set. Unknown (stale) ids
    /// are accepted; they simply never match a current task. Returns the new
    /// completed state and any newly earned badges.
    pub fn toggle_task(&mut self, task_id: &str) -> (bool, Vec<&'static BadgeSpec>) {
        let completed = if self.snapshot.progress.completed.remove(task_id) {
            false
        } else {
            self.snapshot.progress.completed.insert(task_id.to_string());
            true
        };

        let newly = self.publish();
        self.outbox.submit(
            collections::ROADMAP_PROGRESS,
            json!({"completed": self.snapshot.progress.completed}),
        );
        (completed, newly)
    }

    /// Increments today's activity counter. Optimistic: subscribers are
    /// notified before the write is even queued, and a write failure leaves
    /// the increment in place.
    pub fn log_activity(&mut self) -> (u32, Vec<&'static BadgeSpec>) {
        let key = day_key(Utc::now().date_naive());
        let count = {
            let entry = self.snapshot.progress.activity.entry(key).or_insert(0);
            *entry += 1;
            *entry
        };

        let newly = self.publish();
        self.outbox.submit(
            collections::ROADMAP_PROGRESS,
            json!({"activity": self.snapshot.progress.activity}),
        );
        (count, newly)
    }

    /// Replaces the resume analysis (callers persist it in the foreground
    /// before handing it over).
    pub fn put_resume(&mut self, analysis: ResumeAnalysis) -> Vec<&'static BadgeSpec> {
        self.snapshot.resume = Some(analysis);
        self.publish()
    }

    /// Appends an interview record locally (persisted by the caller).
    pub fn push_interview(&mut self, record: InterviewRecord) -> Vec<&'static BadgeSpec> {
        self.snapshot.interviews.push(record);
        self.publish()
    }

    /// Wholesale-replaces the roadmap structure. Completion ids from the
    /// previous structure stay in the progress set; they are tolerated and
    /// count for nothing against the new structure.
    pub fn put_roadmap(&mut self, structure: RoadmapStructure) -> Vec<&'static BadgeSpec> {
        self.snapshot.roadmap = structure;
        self.publish()
    }

    /// Clears everything to defaults and notifies. Used on logout.
    pub fn reset(&mut self) {
        self.snapshot = Snapshot::default();
        self.initialized = false;
        self.notify();
    }

    /// Recompute derived values, award badges, notify. Every mutation funnels
    /// through here so ordering is uniform.
    fn publish(&mut self) -> Vec<&'static BadgeSpec> {
        self.recompute_derived();
        let newly = self.award_badges();
        self.notify();
        newly
    }

    fn recompute_derived(&mut self) {
        self.snapshot.tasks =
            flatten_tasks(&self.snapshot.roadmap, &self.snapshot.progress.completed);

        let interview_scores: Vec<f64> = self
            .snapshot
            .interviews
            .iter()
            .map(|r| r.overall_score as f64)
            .collect();

        self.snapshot.readiness = compute_readiness(
            self.snapshot.resume.as_ref().map(|r| r.overall_score as f64),
            &interview_scores,
            self.snapshot.completion_fraction(),
            &self.weights,
        );

        self.snapshot.streak =
            current_streak(&self.snapshot.progress.activity, Utc::now().date_naive());
    }

    fn award_badges(&mut self) -> Vec<&'static BadgeSpec> {
        let inputs = BadgeInputs {
            resume_score: self.snapshot.resume.as_ref().map(|r| r.overall_score as f64),
            interview_count: self.snapshot.interviews.len(),
            best_interview_score: self
                .snapshot
                .interviews
                .iter()
                .map(|r| r.overall_score as f64)
                .fold(None, |best, s| Some(best.map_or(s, |b: f64| b.max(s)))),
            completion_fraction: self.snapshot.completion_fraction(),
            streak: self.snapshot.streak,
        };

        let newly = evaluate_newly_earned(&inputs, &self.snapshot.badges);
        if newly.is_empty() {
            return newly;
        }

        let now = Utc::now();
        for spec in &newly {
            self.snapshot.badges.earned.insert(spec.id.to_string(), now);
        }
        self.outbox.submit(
            collections::BADGES,
            json!({"earned": self.snapshot.badges.earned}),
        );
        newly
    }

    fn notify(&self) {
        for (_, callback) in &self.subscribers {
            callback(&self.snapshot);
        }
    }
}

/// Decodes one fetched document into its typed entity, isolating failures:
/// a fetch error or malformed document falls back to the default. The bool
/// reports whether a well-formed document was actually loaded.
fn decode_entity<T: Default + DeserializeOwned>(
    result: anyhow::Result<Option<Value>>,
    what: &str,
) -> (T, bool) {
    match result {
        Ok(Some(doc)) => match serde_json::from_value(doc) {
            Ok(entity) => (entity, true),
            Err(e) => {
                warn!("Malformed {what} document, using default: {e}");
                (T::default(), false)
            }
        },
        Ok(None) => {
            debug!("No {what} document yet");
            (T::default(), false)
        }
        Err(e) => {
            warn!("Fetch of {what} failed, using default: {e:#}");
            (T::default(), false)
        }
    }
}

fn decode_interviews(docs: Vec<Value>) -> Vec<InterviewRecord> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed interview record: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn seeded_store(user: Uuid) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            user,
            collections::PROFILES,
            json!({"display_name": "Sam", "target_role": "Backend Engineer"}),
        );
        store.seed(
            user,
            collections::RESUME_ANALYSES,
            json!({"overall_score": 80}),
        );
        store.seed(
            user,
            collections::ROADMAPS,
            json!({"weeks": [
                {"title": "Week 1 Focus: Basics", "topics": [
                    {"title": "Systems", "modules": [
                        {"title": "Memory", "subtopics": ["A", "B"]}
                    ]}
                ]},
                {"title": "Week 2", "topics": [{"title": "Review", "items": ["C"]}]}
            ]}),
        );
        store.seed_item(
            user,
            collections::INTERVIEWS,
            json!({
                "id": Uuid::new_v4(),
                "role": "Backend Engineer",
                "questions": [],
                "overall_score": 90,
                "created_at": Utc::now()
            }),
        );
        store
    }

    async fn initialized(store: &Arc<MemoryStore>, user: Uuid) -> StateAggregator {
        let mut agg = StateAggregator::new(user, store.clone() as Arc<dyn DocumentStore>);
        agg.initialize().await;
        agg
    }

    #[tokio::test]
    async fn test_initialize_loads_and_derives() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = StateAggregator::new(user, store as Arc<dyn DocumentStore>);

        assert!(agg.initialize().await);
        let snap = agg.snapshot();
        assert!(snap.profile_loaded);
        assert_eq!(snap.profile.display_name, "Sam");
        assert_eq!(snap.tasks.len(), 3);
        // 80/100*30 + 90/100*40 + 0*30 = 24 + 36 = 60
        assert_eq!(snap.readiness, 60);
    }

    #[tokio::test]
    async fn test_fetch_failures_are_isolated() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        store.fail_reads_for(collections::PROFILES);
        store.fail_reads_for(collections::RESUME_ANALYSES);

        let mut agg = StateAggregator::new(user, store as Arc<dyn DocumentStore>);
        // Profile fetch failed → partial success reported as false.
        assert!(!agg.initialize().await);

        let snap = agg.snapshot();
        assert!(!snap.profile_loaded);
        assert!(snap.resume.is_none());
        // Roadmap and interviews still loaded.
        assert_eq!(snap.tasks.len(), 3);
        assert_eq!(snap.interviews.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document_falls_back_to_default() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        store.seed(user, collections::ROADMAPS, json!({"weeks": "not-an-array"}));

        let agg = initialized(&store, user).await;
        assert!(agg.snapshot().tasks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_task_updates_and_persists() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;

        let (completed, _) = agg.toggle_task("0-0-0-A");
        assert!(completed);
        assert_eq!(agg.snapshot().completed_task_count(), 1);
        assert_eq!(agg.snapshot().completion_fraction(), Some(1.0 / 3.0));

        tokio::time::sleep(Duration::from_secs(10)).await;
        let doc = store.document(user, collections::ROADMAP_PROGRESS).unwrap();
        assert_eq!(doc["completed"], json!(["0-0-0-A"]));
        assert_eq!(
            agg.sync_states().get(collections::ROADMAP_PROGRESS),
            Some(&SyncState::Synced)
        );

        let (completed, _) = agg.toggle_task("0-0-0-A");
        assert!(!completed);
        assert_eq!(agg.snapshot().completed_task_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_keeps_optimistic_state() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;
        store.fail_all_writes(true);

        let (count, _) = agg.log_activity();
        assert_eq!(count, 1);
        assert_eq!(agg.snapshot().streak, 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        // Not rolled back, but observably out of sync.
        assert_eq!(agg.snapshot().streak, 1);
        assert_eq!(
            agg.sync_states().get(collections::ROADMAP_PROGRESS),
            Some(&SyncState::Failed)
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_recomputed_snapshots() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let id = agg.subscribe(move |snap| {
            // Derived values are always consistent with sources.
            assert_eq!(
                snap.completed_task_count(),
                snap.tasks.iter().filter(|t| t.completed).count()
            );
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        // Immediate invocation on subscribe.
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        agg.toggle_task("1-0-C");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        agg.unsubscribe(id);
        agg.toggle_task("1-0-C");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_badges_awarded_and_persisted_once() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;
        // resume-analyzed, ats-contender, first-interview, interview-ace
        // are all earned at load time.
        assert!(agg.snapshot().badges.contains("interview-ace"));

        let (_, newly) = agg.toggle_task("0-0-0-A");
        let (_, newly2) = agg.toggle_task("0-0-0-B");
        let newly_ids: Vec<_> = newly.iter().chain(&newly2).map(|b| b.id).collect();
        assert!(newly_ids.contains(&"halfway-there"));
        // Earned set never re-reports.
        let (_, newly3) = agg.toggle_task("1-0-C");
        assert_eq!(
            newly3.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec!["roadmap-complete"]
        );

        tokio::time::sleep(Duration::from_secs(10)).await;
        let doc = store.document(user, collections::BADGES).unwrap();
        assert!(doc["earned"].get("roadmap-complete").is_some());
    }

    #[tokio::test]
    async fn test_roadmap_replacement_leaves_stale_ids_inert() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;
        agg.toggle_task("0-0-0-A");

        let replacement: RoadmapStructure = serde_json::from_value(json!({
            "weeks": [{"title": "Week 1", "topics": [{"title": "New", "items": ["X"]}]}]
        }))
        .unwrap();
        agg.put_roadmap(replacement);

        let snap = agg.snapshot();
        // The stale id survives in the set but matches no current task.
        assert!(snap.progress.completed.contains("0-0-0-A"));
        assert_eq!(snap.completed_task_count(), 0);
        assert_eq!(snap.completion_fraction(), Some(0.0));
    }

    #[tokio::test]
    async fn test_reset_clears_state_and_notifies() {
        let user = Uuid::new_v4();
        let store = seeded_store(user);
        let mut agg = initialized(&store, user).await;

        let last_readiness = Arc::new(AtomicU32::new(u32::MAX));
        let seen = last_readiness.clone();
        agg.subscribe(move |snap| seen.store(snap.readiness, Ordering::SeqCst));

        agg.reset();
        assert!(!agg.is_initialized());
        assert_eq!(agg.snapshot().readiness, 0);
        assert!(agg.snapshot().tasks.is_empty());
        assert_eq!(last_readiness.load(Ordering::SeqCst), 0);
    }
}
