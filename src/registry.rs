//! Explicit member registry and deprecation interception.
//!
//! A [`Namespace`] is the registration point that replaces in-place
//! rewriting of a type's dispatch table: callables are registered under a
//! display name, call sites opt in by dispatching through the namespace,
//! and marking a member deprecated makes every subsequent dispatch report
//! through the namespace's [`Reporter`] before forwarding arguments and
//! result unchanged to the original callable.
//!
//! Members take a single argument value; multiple arguments travel as a
//! tuple, which may include trailing continuation closures. A member
//! registered with argument type `A` and return type `R` must be invoked
//! with exactly those types; anything else fails with
//! [`Error::SignatureMismatch`].

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::Error;
use crate::reporter::Reporter;

/// How a member is addressed, which determines the subject separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Class-level member, displayed as `Type.member`.
    Static,
    /// Instance member, displayed as `Type#member`.
    Instance,
    /// Object construction, displayed as the bare type name.
    Constructor,
}

impl CallKind {
    fn separator(self) -> &'static str {
        match self {
            CallKind::Static => ".",
            CallKind::Instance => "#",
            CallKind::Constructor => "",
        }
    }

    /// Returns a short stable label for logs and metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            CallKind::Static => "static",
            CallKind::Instance => "instance",
            CallKind::Constructor => "constructor",
        }
    }

    fn subject(self, namespace: &str, member: &str) -> String {
        match self {
            CallKind::Constructor => namespace.to_string(),
            kind => format!("{}{}{}", namespace, kind.separator(), member),
        }
    }
}

/// Slot name under which the construction entry point is registered.
const CONSTRUCTOR_NAME: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemberKey {
    name: String,
    kind: CallKind,
}

impl MemberKey {
    fn new(name: &str, kind: CallKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
struct DeprecationMark {
    alternative: Option<String>,
    note: Option<String>,
}

struct MemberSlot {
    /// Type-erased `Arc<dyn Fn(A) -> R + Send + Sync>`.
    callable: Box<dyn Any + Send + Sync>,
    /// Registered signature, kept for mismatch diagnostics.
    signature: &'static str,
    /// Present once the member has been marked deprecated. Never cleared.
    mark: Option<DeprecationMark>,
}

/// Resolved member, cloned out of the registry so no lock is held while the
/// original callable runs.
struct Resolved<A, R> {
    owner: String,
    callable: Arc<dyn Fn(A) -> R + Send + Sync>,
    mark: Option<DeprecationMark>,
}

/// A named registration point for callables.
///
/// Namespaces form subtype chains: a member that is not defined on a
/// namespace resolves through its ancestors, and a deprecation notice is
/// addressed to the defining namespace's name, not the one the call entered
/// through.
pub struct Namespace {
    name: String,
    parent: Option<Arc<Namespace>>,
    reporter: Option<Arc<Reporter>>,
    members: RwLock<HashMap<MemberKey, MemberSlot>>,
}

impl Namespace {
    /// Creates a namespace reporting through the process-wide reporter.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::assemble(name.into(), None, None)
    }

    /// Creates a namespace reporting through an injected reporter.
    pub fn with_reporter(name: impl Into<String>, reporter: Arc<Reporter>) -> Arc<Self> {
        Self::assemble(name.into(), None, Some(reporter))
    }

    /// Creates a subtype namespace that inherits members and reporter from
    /// `parent`.
    pub fn subtype(parent: &Arc<Namespace>, name: impl Into<String>) -> Arc<Self> {
        Self::assemble(name.into(), Some(parent.clone()), parent.reporter.clone())
    }

    fn assemble(
        name: String,
        parent: Option<Arc<Namespace>>,
        reporter: Option<Arc<Reporter>>,
    ) -> Arc<Self> {
        debug!(namespace = %name, "namespace created");
        Arc::new(Self {
            name,
            parent,
            reporter,
            members: RwLock::new(HashMap::new()),
        })
    }

    /// Display name used as the subject prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a class-level member.
    ///
    /// Redefining an existing member replaces the callable but keeps any
    /// deprecation mark already placed on it.
    pub fn register_static<A, R, F>(&self, name: &str, member: F)
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.register(name, CallKind::Static, member);
    }

    /// Registers an instance member.
    pub fn register_instance<A, R, F>(&self, name: &str, member: F)
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.register(name, CallKind::Instance, member);
    }

    /// Registers the construction entry point.
    pub fn register_constructor<A, R, F>(&self, constructor: F)
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.register(CONSTRUCTOR_NAME, CallKind::Constructor, constructor);
    }

    fn register<A, R, F>(&self, name: &str, kind: CallKind, member: F)
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let callable: Arc<dyn Fn(A) -> R + Send + Sync> = Arc::new(member);
        let key = MemberKey::new(name, kind);
        let mut members = self.members_write();
        // The set of marked members only grows: redefinition keeps the mark.
        let mark = members.remove(&key).and_then(|slot| slot.mark);
        members.insert(
            key,
            MemberSlot {
                callable: Box::new(callable),
                signature: type_name::<fn(A) -> R>(),
                mark,
            },
        );
        debug!(
            namespace = %self.name,
            member = %name,
            kind = kind.as_label(),
            "member registered"
        );
    }

    /// Marks a member deprecated.
    ///
    /// Name-resolution failures surface here, at marking time, so typos are
    /// caught when the deprecation is declared rather than on first call.
    /// Marking an already-marked member is a silent no-op; the original
    /// callable is never lost and never reports twice per call.
    ///
    /// A bare `alternative` must resolve on this namespace (for the same
    /// call kind) and is then displayed fully qualified; a value that
    /// already carries a `.` or `#` qualifier is used verbatim as display
    /// text.
    pub fn mark_member_deprecated(
        &self,
        name: &str,
        kind: CallKind,
        alternative: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), Error> {
        let key = MemberKey::new(name, kind);
        let mut members = self.members_write();

        let Some(slot) = members.get(&key) else {
            return Err(self.member_not_found(name));
        };
        if slot.mark.is_some() {
            debug!(
                namespace = %self.name,
                member = %name,
                "member already marked deprecated, skipping"
            );
            return Ok(());
        }

        let alternative = resolve_alternative(&self.name, &members, alternative, kind)?;
        if let Some(slot) = members.get_mut(&key) {
            slot.mark = Some(DeprecationMark {
                alternative,
                note: note.map(str::to_string),
            });
        }
        drop(members);

        self.reporter()
            .metrics()
            .record_mark(&self.name, kind.as_label());
        debug!(
            namespace = %self.name,
            member = %name,
            kind = kind.as_label(),
            "member marked deprecated"
        );
        Ok(())
    }

    /// Marks the construction entry point deprecated. The subject reported
    /// on construction is the namespace's own display name.
    ///
    /// A bare `alternative` names a replacement factory among the static
    /// members; qualification rules mirror [`Namespace::mark_member_deprecated`].
    pub fn mark_constructor_deprecated(
        &self,
        alternative: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), Error> {
        self.mark_member_deprecated(CONSTRUCTOR_NAME, CallKind::Constructor, alternative, note)
    }

    /// Invokes a class-level member, reporting first if it is marked.
    #[track_caller]
    pub fn call_static<A, R>(&self, name: &str, args: A) -> Result<R, Error>
    where
        A: 'static,
        R: 'static,
    {
        self.invoke(name, CallKind::Static, args)
    }

    /// Invokes an instance member, reporting first if it is marked.
    #[track_caller]
    pub fn call_instance<A, R>(&self, name: &str, args: A) -> Result<R, Error>
    where
        A: 'static,
        R: 'static,
    {
        self.invoke(name, CallKind::Instance, args)
    }

    /// Invokes the construction entry point, reporting first if it is
    /// marked, and returns the constructed value.
    #[track_caller]
    pub fn construct<A, R>(&self, args: A) -> Result<R, Error>
    where
        A: 'static,
        R: 'static,
    {
        self.invoke(CONSTRUCTOR_NAME, CallKind::Constructor, args)
    }

    #[track_caller]
    fn invoke<A, R>(&self, name: &str, kind: CallKind, args: A) -> Result<R, Error>
    where
        A: 'static,
        R: 'static,
    {
        let key = MemberKey::new(name, kind);
        let Some(resolved) = self.locate::<A, R>(&key)? else {
            return Err(self.member_not_found(name));
        };

        if let Some(mark) = &resolved.mark {
            let subject = kind.subject(&resolved.owner, name);
            self.reporter()
                .report(&subject, mark.alternative.as_deref(), mark.note.as_deref())?;
        }

        Ok((resolved.callable)(args))
    }

    /// Walks this namespace, then its ancestors. `Ok(None)` means the
    /// member is not defined anywhere on the chain.
    fn locate<A, R>(&self, key: &MemberKey) -> Result<Option<Resolved<A, R>>, Error>
    where
        A: 'static,
        R: 'static,
    {
        let members = self.members_read();
        if let Some(slot) = members.get(key) {
            let callable = slot
                .callable
                .downcast_ref::<Arc<dyn Fn(A) -> R + Send + Sync>>()
                .ok_or_else(|| Error::SignatureMismatch {
                    member: key.kind.subject(&self.name, &key.name),
                    expected: slot.signature,
                    requested: type_name::<fn(A) -> R>(),
                })?
                .clone();
            return Ok(Some(Resolved {
                owner: self.name.clone(),
                callable,
                mark: slot.mark.clone(),
            }));
        }
        drop(members);

        match &self.parent {
            Some(parent) => parent.locate(key),
            None => Ok(None),
        }
    }

    fn reporter(&self) -> &Reporter {
        match &self.reporter {
            Some(reporter) => reporter.as_ref(),
            None => crate::reporter::reporter(),
        }
    }

    fn member_not_found(&self, member: &str) -> Error {
        Error::MemberNotFound {
            member: member.to_string(),
            namespace: self.name.clone(),
        }
    }

    fn members_read(&self) -> RwLockReadGuard<'_, HashMap<MemberKey, MemberSlot>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn members_write(&self) -> RwLockWriteGuard<'_, HashMap<MemberKey, MemberSlot>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve_alternative(
    namespace: &str,
    members: &HashMap<MemberKey, MemberSlot>,
    alternative: Option<&str>,
    kind: CallKind,
) -> Result<Option<String>, Error> {
    let Some(alternative) = alternative else {
        return Ok(None);
    };

    // Already-qualified names are display text, not resolution candidates.
    if alternative.contains('.') || alternative.contains('#') {
        return Ok(Some(alternative.to_string()));
    }

    // A constructor's bare alternative names a replacement factory.
    let kind = match kind {
        CallKind::Constructor => CallKind::Static,
        kind => kind,
    };
    if members.contains_key(&MemberKey::new(alternative, kind)) {
        Ok(Some(format!(
            "{}{}{}",
            namespace,
            kind.separator(),
            alternative
        )))
    } else {
        Err(Error::MemberNotFound {
            member: alternative.to_string(),
            namespace: namespace.to_string(),
        })
    }
}
