use crate::cluster::{classify, NodeId, Role};
use crate::core::NodeDocs;
use crate::error::InvariantViolation;
use hashbrown::{HashMap, HashSet};
use linked_hash_map::LinkedHashMap;
use std::collections::BTreeMap;

/// What changed in the cluster's membership during one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
  /// Identities seen for the first time. Empty on the first cycle, which only establishes the
  /// baseline.
  pub joined: Vec<NodeId>,
  /// `(old, new)` pairs: a missing identity whose name reappeared under a new identity.
  pub restarted: Vec<(NodeId, NodeId)>,
  /// Missing identities no new identity could be matched to. They stay tracked.
  pub departed: Vec<NodeId>,
  /// `(id, old, new)` for identities whose role changed.
  pub role_changes: Vec<(NodeId, Role, Role)>,
  /// Departed identities dropped because they stayed missing for as many cycles as allowed.
  pub forgotten: Vec<NodeId>,
}
impl ReconcileOutcome {
  /// Identities that are no longer tracked after this reconciliation, and whose counter
  /// baselines must go too.
  pub fn pruned(&self) -> impl Iterator<Item = &NodeId> {
    self.restarted.iter().map(|(old, _)| old).chain(self.forgotten.iter())
  }
}

/// The set of node identities believed to be part of the cluster, grouped by role.
///
/// Every tracked identity is in exactly one role group, and the membership set is exactly the
/// union of the groups. Within a group identities keep the order they were added in.
#[derive(Debug, Default)]
pub struct MembershipTracker {
  members: HashMap<NodeId, Role>,
  groups: BTreeMap<Role, LinkedHashMap<NodeId, ()>>,
  names: HashMap<NodeId, String>,
  joined: HashSet<NodeId>,
  absent: HashMap<NodeId, u32>,
  forget_after: Option<u32>,
  started: bool,
}
impl MembershipTracker {
  /// Creates an empty tracker. With `forget_after` set, a departed identity is dropped on the
  /// `forget_after`th consecutive cycle it is missing from; otherwise it is kept until a restart
  /// under the same name replaces it.
  pub fn new(forget_after: Option<u32>) -> MembershipTracker {
    MembershipTracker {
      forget_after: forget_after,
      ..MembershipTracker::default()
    }
  }

  /// Folds one snapshot into the tracked membership.
  pub fn reconcile(&mut self, nodes: &NodeDocs) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    let baseline = !self.started;
    self.started |= !nodes.is_empty();
    self.joined.clear();

    let fresh = nodes.iter().filter(|(id, _)| !self.members.contains_key(*id)).collect::<Vec<_>>();
    for (id, doc) in fresh {
      let name = doc.name().unwrap_or_else(|| id.as_str()).to_string();
      self.insert(id.clone(), name, classify(&doc.capabilities()));
      if !baseline {
        self.joined.insert(id.clone());
        outcome.joined.push(id.clone());
      }
    }

    let seen = nodes.iter().filter(|(id, _)| !self.joined.contains(*id)).collect::<Vec<_>>();
    for (id, doc) in seen {
      self.absent.remove(id);
      if let Some(name) = doc.name() {
        if self.names.get(id).map(String::as_str) != Some(name) {
          self.names.insert(id.clone(), name.to_string());
        }
      }
      let role = classify(&doc.capabilities());
      let current = self.members[id];
      if role != current {
        self.relabel(id, current, role);
        outcome.role_changes.push((id.clone(), current, role));
      }
    }

    // Each newly joined identity can stand in for at most one missing identity.
    let mut by_name = HashMap::<String, NodeId>::new();
    for id in &outcome.joined {
      by_name.entry(self.names[id].clone()).or_insert_with(|| id.clone());
    }
    let missing = self
      .iter()
      .filter(|(_, id)| !nodes.contains_key(*id))
      .map(|(_, id)| id.clone())
      .collect::<Vec<_>>();
    let mut restarted = Vec::new();
    let mut departed = Vec::new();
    for id in missing {
      match by_name.remove(&self.names[&id]) {
        Some(new_id) => restarted.push((id, new_id)),
        None => departed.push(id),
      }
    }
    for (old, _) in &restarted {
      self.remove(old);
    }
    for id in departed {
      let cycles = self.absent.entry(id.clone()).or_insert(0);
      *cycles += 1;
      if self.forget_after.map_or(false, |limit| *cycles >= limit) {
        self.remove(&id);
        outcome.forgotten.push(id);
      } else {
        outcome.departed.push(id);
      }
    }
    outcome.restarted = restarted;
    outcome
  }

  fn insert(&mut self, id: NodeId, name: String, role: Role) {
    self.groups.entry(role).or_default().insert(id.clone(), ());
    self.names.insert(id.clone(), name);
    self.members.insert(id, role);
  }

  fn remove(&mut self, id: &NodeId) {
    if let Some(role) = self.members.remove(id) {
      if let Some(group) = self.groups.get_mut(&role) {
        group.remove(id);
      }
    }
    self.names.remove(id);
    self.absent.remove(id);
    self.joined.remove(id);
  }

  fn relabel(&mut self, id: &NodeId, from: Role, to: Role) {
    if let Some(group) = self.groups.get_mut(&from) {
      group.remove(id);
    }
    self.groups.entry(to).or_default().insert(id.clone(), ());
    self.members.insert(id.clone(), to);
  }

  /// Every tracked identity with its role, grouped by role in render order, then in the order
  /// the identities were added to their group.
  pub fn iter(&self) -> impl Iterator<Item = (Role, &NodeId)> {
    self
      .groups
      .iter()
      .flat_map(|(role, group)| group.keys().map(move |id| (*role, id)))
  }

  /// The identities in `role`'s group, in insertion order.
  pub fn group(&self, role: Role) -> Vec<NodeId> {
    self
      .groups
      .get(&role)
      .map(|g| g.keys().cloned().collect())
      .unwrap_or_default()
  }

  /// The membership set.
  pub fn membership(&self) -> im::HashSet<NodeId> {
    self.members.keys().cloned().collect()
  }

  /// Whether `id` is tracked.
  pub fn contains(&self, id: &NodeId) -> bool {
    self.members.contains_key(id)
  }

  /// The tracked role of `id`.
  pub fn role_of(&self, id: &NodeId) -> Option<Role> {
    self.members.get(id).copied()
  }

  /// The last known name of `id`.
  pub fn name_of(&self, id: &NodeId) -> Option<&str> {
    self.names.get(id).map(String::as_str)
  }

  /// Whether `id` was first seen in the latest reconciliation.
  pub fn newly_joined(&self, id: &NodeId) -> bool {
    self.joined.contains(id)
  }

  /// Number of tracked identities.
  pub fn len(&self) -> usize {
    self.members.len()
  }

  /// Whether nothing is tracked.
  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  /// Verifies the structural invariants: every member in exactly one group whose role matches
  /// the recorded one, no group entry outside the membership set, and a name for every member.
  pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
    let mut seen = HashMap::<&NodeId, Role>::with_capacity(self.members.len());
    for (role, id) in self.iter() {
      if let Some(first) = seen.insert(id, role) {
        return Err(InvariantViolation::DuplicateGroup {
          id: id.clone(),
          first: first,
          second: role,
        });
      }
      match self.members.get(id) {
        None => {
          return Err(InvariantViolation::Untracked {
            id: id.clone(),
            detail: "in a role group but not a member",
          })
        }
        Some(recorded) if *recorded != role => {
          return Err(InvariantViolation::RoleMismatch {
            id: id.clone(),
            recorded: *recorded,
            grouped: role,
          })
        }
        Some(_) => {}
      }
    }
    for id in self.members.keys() {
      if !seen.contains_key(id) {
        return Err(InvariantViolation::Untracked {
          id: id.clone(),
          detail: "a member without a role group",
        });
      }
      if !self.names.contains_key(id) {
        return Err(InvariantViolation::Untracked {
          id: id.clone(),
          detail: "a member without a name",
        });
      }
    }
    if let Some(id) = self.names.keys().find(|id| !self.members.contains_key(*id)) {
      return Err(InvariantViolation::Untracked {
        id: id.clone(),
        detail: "named but not a member",
      });
    }
    Ok(())
  }
}

#[cfg(test)]
use crate::core::NodeDoc;
#[cfg(test)]
use serde_json::json;

#[cfg(test)]
fn docs(nodes: &[(&str, &str, bool, bool)]) -> NodeDocs {
  nodes
    .iter()
    .map(|(id, name, data, master)| {
      let doc = json!({
        "name": name,
        "attributes": { "data": data.to_string(), "master": master.to_string() }
      });
      (NodeId::from(*id), NodeDoc::new(doc))
    })
    .collect()
}

#[test]
fn test_first_cycle_is_baseline() {
  let mut tracker = MembershipTracker::new(None);
  let outcome =
    tracker.reconcile(&docs(&[("a", "n1", true, true), ("b", "n2", true, false)]));
  assert_eq!(outcome, ReconcileOutcome::default());
  assert_eq!(tracker.group(Role::All), vec![NodeId::from("a")]);
  assert_eq!(tracker.group(Role::Data), vec![NodeId::from("b")]);
  assert!(!tracker.newly_joined(&NodeId::from("a")));
  tracker.check_invariants().unwrap();
}

#[test]
fn test_join_and_restart() {
  let mut tracker = MembershipTracker::new(None);
  tracker.reconcile(&docs(&[("a", "n1", true, true), ("b", "n2", true, false)]));
  let outcome = tracker.reconcile(&docs(&[
    ("a", "n1", true, true),
    ("c", "n2", true, false),
    ("d", "n3", true, false),
  ]));
  assert_eq!(outcome.joined, vec![NodeId::from("c"), NodeId::from("d")]);
  assert_eq!(outcome.restarted, vec![(NodeId::from("b"), NodeId::from("c"))]);
  assert!(outcome.departed.is_empty());
  assert!(!tracker.contains(&NodeId::from("b")));
  assert!(tracker.newly_joined(&NodeId::from("c")));
  assert_eq!(tracker.group(Role::Data), vec![NodeId::from("c"), NodeId::from("d")]);
  tracker.check_invariants().unwrap();
}

#[test]
fn test_one_replacement_per_restart() {
  let mut tracker = MembershipTracker::new(None);
  tracker.reconcile(&docs(&[("a", "twin", true, false), ("b", "twin", true, false)]));
  let outcome = tracker.reconcile(&docs(&[("c", "twin", true, false)]));
  assert_eq!(outcome.restarted, vec![(NodeId::from("a"), NodeId::from("c"))]);
  assert_eq!(outcome.departed, vec![NodeId::from("b")]);
  tracker.check_invariants().unwrap();
}

#[test]
fn test_role_change_moves_group() {
  let mut tracker = MembershipTracker::new(None);
  tracker.reconcile(&docs(&[("a", "n1", true, false), ("b", "n2", true, false)]));
  let outcome = tracker.reconcile(&docs(&[("a", "n1", true, true), ("b", "n2", true, false)]));
  assert_eq!(outcome.role_changes, vec![(NodeId::from("a"), Role::Data, Role::All)]);
  assert_eq!(tracker.group(Role::All), vec![NodeId::from("a")]);
  assert_eq!(tracker.group(Role::Data), vec![NodeId::from("b")]);
  assert_eq!(tracker.role_of(&NodeId::from("a")), Some(Role::All));
  tracker.check_invariants().unwrap();
}

#[test]
fn test_forget_after() {
  let mut tracker = MembershipTracker::new(Some(2));
  tracker.reconcile(&docs(&[("a", "n1", true, true), ("b", "n2", true, true)]));
  let only_a = docs(&[("a", "n1", true, true)]);
  assert_eq!(tracker.reconcile(&only_a).departed, vec![NodeId::from("b")]);
  let outcome = tracker.reconcile(&only_a);
  assert!(outcome.departed.is_empty());
  assert_eq!(outcome.forgotten, vec![NodeId::from("b")]);
  assert!(!tracker.contains(&NodeId::from("b")));
  tracker.check_invariants().unwrap();
}

#[test]
fn test_absence_count_resets_on_return() {
  let mut tracker = MembershipTracker::new(Some(2));
  let both = docs(&[("a", "n1", true, true), ("b", "n2", true, true)]);
  let only_a = docs(&[("a", "n1", true, true)]);
  tracker.reconcile(&both);
  assert_eq!(tracker.reconcile(&only_a).departed, vec![NodeId::from("b")]);
  tracker.reconcile(&both);
  assert_eq!(tracker.reconcile(&only_a).departed, vec![NodeId::from("b")]);
  assert!(tracker.contains(&NodeId::from("b")));
}

#[test]
fn test_join_after_everything_forgotten() {
  let mut tracker = MembershipTracker::new(Some(1));
  tracker.reconcile(&docs(&[("a", "n1", true, true)]));
  assert_eq!(tracker.reconcile(&docs(&[])).forgotten, vec![NodeId::from("a")]);
  assert!(tracker.is_empty());
  assert_eq!(tracker.reconcile(&docs(&[])), ReconcileOutcome::default());
  let outcome = tracker.reconcile(&docs(&[("b", "n2", true, true)]));
  assert_eq!(outcome.joined, vec![NodeId::from("b")]);
  assert!(tracker.newly_joined(&NodeId::from("b")));
  tracker.check_invariants().unwrap();
}

#[test]
fn test_empty_first_snapshot_keeps_baseline() {
  let mut tracker = MembershipTracker::new(None);
  tracker.reconcile(&docs(&[]));
  let outcome = tracker.reconcile(&docs(&[("a", "n1", true, true)]));
  assert!(outcome.joined.is_empty());
  assert!(!tracker.newly_joined(&NodeId::from("a")));
}

#[test]
fn test_invariant_violations_detected() {
  let mut tracker = MembershipTracker::new(None);
  tracker.reconcile(&docs(&[("a", "n1", true, true)]));
  let a = NodeId::from("a");
  tracker.groups.entry(Role::Data).or_default().insert(a.clone(), ());
  assert_eq!(
    tracker.check_invariants(),
    Err(InvariantViolation::DuplicateGroup {
      id: a.clone(),
      first: Role::All,
      second: Role::Data
    })
  );
  tracker.groups.get_mut(&Role::Data).unwrap().remove(&a);
  tracker.names.remove(&a);
  assert!(matches!(
    tracker.check_invariants(),
    Err(InvariantViolation::Untracked { .. })
  ));
}
