use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::GameError;

/// Ordered, non-empty list of the actions available to one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<A>", bound(deserialize = "A: Deserialize<'de>"))]
pub struct ActionSet<A>(Vec<A>);

impl<A> ActionSet<A> {
    pub fn new(actions: Vec<A>) -> Result<Self, GameError> {
        if actions.is_empty() {
            return Err(GameError::EmptyActionSet);
        }
        Ok(ActionSet(actions))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.0.iter()
    }
}

impl<A> TryFrom<Vec<A>> for ActionSet<A> {
    type Error = GameError;

    fn try_from(actions: Vec<A>) -> Result<Self, Self::Error> {
        ActionSet::new(actions)
    }
}

impl<A> Index<usize> for ActionSet<A> {
    type Output = A;

    fn index(&self, index: usize) -> &A {
        &self.0[index]
    }
}
