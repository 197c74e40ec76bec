use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Payloads, and Actions)
// =============================================================================

/// Failures raised by the actor plumbing itself rather than by domain rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the response")]
    ActorDropped,
}

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
///
/// Every hook runs inside the owning actor, one request at a time. Hooks that
/// mutate run against a working copy which only replaces the stored entity
/// when the hook succeeds, so a failed update or action never leaves a
/// half-applied entity behind.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Short name used in logs and span fields.
    const KIND: &'static str;

    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + From<FrameworkError> + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Uniqueness constraints, checked against every other stored entity on
    /// create and update.
    fn check_unique<'a, I>(&self, _others: I) -> Result<(), Self::Error>
    where
        Self: 'a,
        I: Iterator<Item = &'a Self> + Clone,
    {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Predicate shipped to the actor for lookups by something other than the id.
pub struct Filter<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    pub fn all() -> Self {
        Self::new(|_| true)
    }

    fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Id generator producing `prefix_1`, `prefix_2`, ...
pub fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = AtomicU64::new(1);
    move || format!("{prefix}_{}", counter.fetch_add(1, Ordering::SeqCst))
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    Find {
        filter: Filter<T>,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Find { filter, respond_to } => {
                    let found = self.store.values().find(|item| filter.matches(item)).cloned();
                    let _ = respond_to.send(Ok(found));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| filter.matches(item))
                        .cloned()
                        .collect();
                    debug!(count = items.len(), "Listed items");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                ResourceRequest::Shutdown => {
                    info!("Actor shutting down");
                    break;
                }
            }
        }

        info!("Actor stopped");
    }

    fn handle_create(&mut self, payload: T::CreatePayload) -> Result<T, T::Error> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id.clone(), payload)?;
        item.on_create()?;
        item.check_unique(self.store.values())?;

        self.store.insert(id.clone(), item.clone());
        debug!(%id, "Item created");
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let mut updated = self.stored(&id)?.clone();
        updated.on_update(patch)?;
        updated.check_unique(self.store.values().filter(|other| other.id() != &id))?;

        self.store.insert(id.clone(), updated.clone());
        debug!(%id, "Item updated");
        Ok(updated)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), T::Error> {
        self.stored(&id)?.on_delete()?;
        self.store.remove(&id);
        debug!(%id, "Item deleted");
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let mut working = self.stored(&id)?.clone();
        match working.handle_action(action) {
            Ok(result) => {
                self.store.insert(id, working);
                Ok(result)
            }
            Err(e) => {
                warn!(%id, error = %e, "Action rejected");
                Err(e)
            }
        }
    }

    fn stored(&self, id: &T::Id) -> Result<&T, T::Error> {
        self.store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()).into())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// Cloneable handle to a [`ResourceActor`]; the only way to reach its store.
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> Debug for ResourceClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient").field("kind", &T::KIND).finish()
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn find(&self, filter: Filter<T>) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Find { filter, respond_to })
            .await
    }

    pub async fn list(&self, filter: Filter<T>) -> Result<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), T::Error> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }

    /// Asks the actor to stop after the requests already queued.
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Tag {
        id: String,
        label: String,
        pinned: bool,
    }

    #[derive(Debug)]
    struct TagCreate {
        label: String,
    }

    #[derive(Debug)]
    struct TagPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum TagAction {
        Pin,
        Relabel(String),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    enum TagError {
        #[error("duplicate label {0}")]
        Duplicate(String),
        #[error("empty label")]
        Empty,
        #[error(transparent)]
        Framework(#[from] FrameworkError),
    }

    impl Entity for Tag {
        const KIND: &'static str = "tag";

        type Id = String;
        type CreatePayload = TagCreate;
        type Patch = TagPatch;
        type Action = TagAction;
        type ActionResult = bool;
        type Error = TagError;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create(id: String, payload: TagCreate) -> Result<Self, TagError> {
            Ok(Self {
                id,
                label: payload.label,
                pinned: false,
            })
        }

        fn on_update(&mut self, patch: TagPatch) -> Result<(), TagError> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn check_unique<'a, I>(&self, mut others: I) -> Result<(), TagError>
        where
            Self: 'a,
            I: Iterator<Item = &'a Self> + Clone,
        {
            if others.any(|other| other.label == self.label) {
                return Err(TagError::Duplicate(self.label.clone()));
            }
            Ok(())
        }

        fn handle_action(&mut self, action: TagAction) -> Result<bool, TagError> {
            match action {
                TagAction::Pin => {
                    let changed = !self.pinned;
                    self.pinned = true;
                    Ok(changed)
                }
                TagAction::Relabel(label) => {
                    // Mutates before failing so the test can observe the rollback.
                    self.label = label;
                    if self.label.is_empty() {
                        return Err(TagError::Empty);
                    }
                    Ok(true)
                }
            }
        }
    }

    fn spawn_tags() -> ResourceClient<Tag> {
        let (actor, client) = ResourceActor::new(10, sequential_ids("tag"));
        tokio::spawn(actor.run());
        client
    }

    fn create(label: &str) -> TagCreate {
        TagCreate {
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_tags();

        let tag = client.create(create("rust")).await.unwrap();
        assert_eq!(tag.id, "tag_1");

        let changed = client.perform_action(tag.id.clone(), TagAction::Pin).await.unwrap();
        assert!(changed);

        let stored = client.get(tag.id.clone()).await.unwrap().unwrap();
        assert!(stored.pinned);

        let changed_again = client.perform_action(tag.id.clone(), TagAction::Pin).await.unwrap();
        assert!(!changed_again);
    }

    #[tokio::test]
    async fn failed_action_leaves_stored_entity_untouched() {
        let client = spawn_tags();
        let tag = client.create(create("rust")).await.unwrap();

        let result = client
            .perform_action(tag.id.clone(), TagAction::Relabel(String::new()))
            .await;
        assert_eq!(result, Err(TagError::Empty));

        let stored = client.get(tag.id).await.unwrap().unwrap();
        assert_eq!(stored.label, "rust");
    }

    #[tokio::test]
    async fn uniqueness_is_checked_on_create_and_update() {
        let client = spawn_tags();
        let _rust = client.create(create("rust")).await.unwrap();
        let tokio_tag = client.create(create("tokio")).await.unwrap();

        let duplicate = client.create(create("rust")).await;
        assert_eq!(duplicate, Err(TagError::Duplicate("rust".to_string())));

        let clash = client
            .update(
                tokio_tag.id.clone(),
                TagPatch {
                    label: Some("rust".to_string()),
                },
            )
            .await;
        assert_eq!(clash, Err(TagError::Duplicate("rust".to_string())));

        // Re-saving an entity with its own label is not a clash.
        let same = client
            .update(
                tokio_tag.id.clone(),
                TagPatch {
                    label: Some("tokio".to_string()),
                },
            )
            .await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn missing_ids_surface_as_not_found() {
        let client = spawn_tags();

        assert_eq!(client.get("tag_9".to_string()).await, Ok(None));
        assert_eq!(
            client.delete("tag_9".to_string()).await,
            Err(TagError::Framework(FrameworkError::NotFound("tag_9".to_string())))
        );
        assert!(matches!(
            client.perform_action("tag_9".to_string(), TagAction::Pin).await,
            Err(TagError::Framework(FrameworkError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn find_and_list_use_filters() {
        let client = spawn_tags();
        client.create(create("rust")).await.unwrap();
        client.create(create("tokio")).await.unwrap();
        client.create(create("tracing")).await.unwrap();

        let found = client
            .find(Filter::new(|tag: &Tag| tag.label == "tokio"))
            .await
            .unwrap();
        assert_eq!(found.map(|tag| tag.label), Some("tokio".to_string()));

        let starting_with_t = client
            .list(Filter::new(|tag: &Tag| tag.label.starts_with('t')))
            .await
            .unwrap();
        assert_eq!(starting_with_t.len(), 2);

        assert_eq!(client.list(Filter::all()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn requests_after_shutdown_report_closed_actor() {
        let client = spawn_tags();
        client.shutdown().await.unwrap();

        // Queued behind the shutdown, so it is never answered.
        let result = client.get("tag_1".to_string()).await;

        assert!(matches!(
            result,
            Err(TagError::Framework(FrameworkError::ActorClosed | FrameworkError::ActorDropped))
        ));
    }
}
