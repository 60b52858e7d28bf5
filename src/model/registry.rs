/// Insertion-ordered map keyed by entity id.
///
/// Inserting an id that is already present replaces the entry in place.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: T) -> Option<T> {
        let id = id.into();
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((id, value));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let position = self.entries.iter().position(|(key, _)| key == id)?;
        Some(self.entries.remove(position).1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
