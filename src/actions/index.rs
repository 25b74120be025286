// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::collections::HashMap;

use super::ActionId;

/// Insertion-ordered set of output nodes, keyed by result name.
///
/// Holds at most one entry per name. `replace` keeps the position of an
/// overwritten entry; `prepend` pushes to the front (superseding any entry
/// under the same name), which merge relies on to put the consumer's
/// outputs first.
#[derive(Clone, Debug, Default)]
pub struct Index {
    entries: Vec<(String, ActionId)>,
    positions: HashMap<String, usize>,
}

impl Index {
    /// Add a new entry at the back. Returns false (and leaves the index
    /// unchanged) when the name is already present.
    pub fn insert(&mut self, name: &str, id: ActionId) -> bool {
        if self.positions.contains_key(name) {
            return false;
        }
        self.positions.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), id));
        true
    }

    /// Insert, or overwrite an existing entry keeping its position.
    /// Returns the replaced id, if any.
    pub fn replace(&mut self, name: &str, id: ActionId) -> Option<ActionId> {
        if let Some(&pos) = self.positions.get(name) {
            let old = self.entries[pos].1;
            self.entries[pos].1 = id;
            Some(old)
        } else {
            self.insert(name, id);
            None
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ActionId> {
        let pos = self.positions.remove(name)?;
        let (_, id) = self.entries.remove(pos);
        for (shifted_name, _) in &self.entries[pos..] {
            if let Some(p) = self.positions.get_mut(shifted_name) {
                *p -= 1;
            }
        }
        Some(id)
    }

    /// Push an entry to the front. An existing entry under the same name is
    /// removed first, so the new entry wins both position and value.
    pub fn prepend(&mut self, name: &str, id: ActionId) {
        self.remove(name);
        for p in self.positions.values_mut() {
            *p += 1;
        }
        self.positions.insert(name.to_string(), 0);
        self.entries.insert(0, (name.to_string(), id));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<ActionId> {
        self.positions.get(name).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ActionId)> + '_ {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.entries.iter().map(|(_, id)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    pub fn swap(&mut self, other: &mut Index) {
        std::mem::swap(self, other);
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionId, Index};

    #[test]
    fn insert_rejects_duplicates() {
        let mut index = Index::default();
        assert!(index.insert("a", ActionId(0)));
        assert!(!index.insert("a", ActionId(1)));
        assert_eq!(index.get("a"), Some(ActionId(0)));
    }

    #[test]
    fn replace_keeps_position() {
        let mut index = Index::default();
        index.insert("a", ActionId(0));
        index.insert("b", ActionId(1));
        assert_eq!(index.replace("a", ActionId(2)), Some(ActionId(0)));
        let order: Vec<_> = index.iter().collect();
        assert_eq!(order, vec![("a", ActionId(2)), ("b", ActionId(1))]);
    }

    #[test]
    fn remove_shifts_later_entries() {
        let mut index = Index::default();
        index.insert("a", ActionId(0));
        index.insert("b", ActionId(1));
        index.insert("c", ActionId(2));
        assert_eq!(index.remove("b"), Some(ActionId(1)));
        assert_eq!(index.get("c"), Some(ActionId(2)));
        let order: Vec<_> = index.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(order, vec!["a", "c"]);
        assert_eq!(index.remove("b"), None);
    }

    #[test]
    fn prepend_puts_entry_first_and_supersedes() {
        let mut index = Index::default();
        index.insert("a", ActionId(0));
        index.insert("b", ActionId(1));
        index.prepend("b", ActionId(5));
        let order: Vec<_> = index.iter().collect();
        assert_eq!(order, vec![("b", ActionId(5)), ("a", ActionId(0))]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut left = Index::default();
        left.insert("a", ActionId(0));
        let mut right = Index::default();
        right.insert("b", ActionId(1));
        left.swap(&mut right);
        assert!(left.contains("b"));
        assert!(right.contains("a"));
    }
}
