//! Write-back set view
//!
//! A plain `HashSet<String>` paired with a write-back callback. Mutating
//! calls update the set in memory and then hand the whole set to the
//! callback, once per call. Reads go through `Deref` and never touch
//! storage.

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;

use crate::error::Result;

use super::members::assert_member;

type WriteBack<'a> = Box<dyn FnMut(&HashSet<String>) -> Result<()> + 'a>;

/// Set handle whose mutations are persisted as they happen
pub struct MutableSet<'a> {
    members: HashSet<String>,
    write_back: WriteBack<'a>,
}

impl<'a> MutableSet<'a> {
    /// Wrap `members`, persisting every mutation through `write_back`
    pub fn new<F>(members: HashSet<String>, write_back: F) -> Self
    where
        F: FnMut(&HashSet<String>) -> Result<()> + 'a,
    {
        Self {
            members,
            write_back: Box::new(write_back),
        }
    }

    /// Add one member and write the set back
    ///
    /// Returns whether the member was new.
    pub fn add(&mut self, member: impl Into<String>) -> Result<bool> {
        let member = member.into();
        assert_member(&member);
        let inserted = self.members.insert(member);
        (self.write_back)(&self.members)?;
        Ok(inserted)
    }

    /// Union `members` into the set and write it back
    pub fn update<I, S>(&mut self, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for member in members {
            let member = member.into();
            assert_member(&member);
            self.members.insert(member);
        }
        (self.write_back)(&self.members)
    }

    /// Detach the plain set
    pub fn into_inner(self) -> HashSet<String> {
        self.members
    }
}

impl Deref for MutableSet<'_> {
    type Target = HashSet<String>;

    fn deref(&self) -> &HashSet<String> {
        &self.members
    }
}

impl PartialEq<HashSet<String>> for MutableSet<'_> {
    fn eq(&self, other: &HashSet<String>) -> bool {
        self.members == *other
    }
}

impl fmt::Debug for MutableSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}
