use crate::{
    api::{Comment, CommentId, SortField, SortState},
    CommentApi, Error,
};

/// Root comments in the order the API returned them, each with its replies
pub type Forest = im::Vector<Comment>;

/// Returns a forest where `reply` is the last reply of comment `parent_id`,
/// at whatever depth it is.
///
/// Only the comments on the path to the parent are rebuilt. If no comment has
/// id `parent_id`, the forest is returned unchanged.
pub fn insert_reply(forest: &Forest, parent_id: CommentId, reply: Comment) -> Forest {
    try_insert_reply(forest, parent_id, &reply).unwrap_or_else(|| forest.clone())
}

fn try_insert_reply(comments: &Forest, parent_id: CommentId, reply: &Comment) -> Option<Forest> {
    comments.iter().enumerate().find_map(|(i, c)| {
        let updated = match c.id == parent_id {
            true => {
                let mut replies = c.replies.clone();
                replies.push_back(reply.clone());
                c.with_replies(replies)
            }
            // not in this subtree, try the next sibling
            false => c.with_replies(try_insert_reply(&c.replies, parent_id, reply)?),
        };
        Some(comments.update(i, updated))
    })
}

/// Returns a forest with `comment` as its first root, whatever the sort order
pub fn insert_root(forest: &Forest, comment: Comment) -> Forest {
    let mut res = forest.clone();
    res.push_front(comment);
    res
}

/// The forest currently displayed and the sort it was fetched with.
///
/// The forest is only ever replaced by a newer snapshot, either a refetch or
/// the result of merging a freshly posted comment.
#[derive(Clone, Debug, Default)]
pub struct CommentStore {
    forest: Forest,
    sort: SortState,
}

impl CommentStore {
    pub fn new() -> CommentStore {
        CommentStore::default()
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn replace(&mut self, sort: SortState, forest: Forest) {
        self.sort = sort;
        self.forest = forest;
    }

    /// Refetches the forest with the current sort. On failure the previous
    /// forest is kept.
    pub async fn refresh<A>(&mut self, api: &A) -> Result<(), Error>
    where
        A: CommentApi + ?Sized,
    {
        self.fetch(self.sort, api).await
    }

    /// Refetches with the sort toggled on `field`. The new sort only takes
    /// effect once the matching forest has been fetched, so on failure both
    /// the sort and the forest stay as they were.
    pub async fn toggle_sort<A>(&mut self, field: SortField, api: &A) -> Result<(), Error>
    where
        A: CommentApi + ?Sized,
    {
        self.fetch(self.sort.toggle(field), api).await
    }

    async fn fetch<A>(&mut self, sort: SortState, api: &A) -> Result<(), Error>
    where
        A: CommentApi + ?Sized,
    {
        match api.fetch_comments(sort).await {
            Ok(forest) => {
                tracing::debug!(?sort, roots = forest.len(), "fetched comments");
                self.replace(sort, forest);
                Ok(())
            }
            Err(err) => {
                tracing::error!(?err, ?sort, "failed fetching comments");
                Err(err)
            }
        }
    }

    /// Places a comment accepted by the API into the forest.
    ///
    /// Returns false if `parent` is not in the current forest, which happens
    /// when the forest was refetched while the reply was in flight. The reply
    /// is then dropped and will show up with the next refetch.
    pub fn merge(&mut self, parent: Option<CommentId>, comment: Comment) -> bool {
        match parent {
            None => {
                self.forest = insert_root(&self.forest, comment);
                true
            }
            Some(parent) => match try_insert_reply(&self.forest, parent, &comment) {
                Some(forest) => {
                    self.forest = forest;
                    true
                }
                None => {
                    tracing::warn!(
                        ?parent,
                        comment = ?comment.id,
                        "parent of new reply is not in the current forest, dropping it"
                    );
                    false
                }
            },
        }
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        Comment::find(&self.forest, id)
    }

    /// Every comment with its depth, in display order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self.forest.iter())],
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, im::vector::Iter<'a, Comment>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Comment);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(c) => {
                    self.stack.push((depth + 1, c.replies.iter()));
                    return Some((depth, c));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: CommentId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            home_page: None,
            text: format!("comment {id}"),
            parent: parent.map(CommentId),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            avatar_url: None,
            attachment_url: None,
            replies: im::Vector::new(),
        }
    }

    fn with(mut c: Comment, replies: Vec<Comment>) -> Comment {
        c.replies = replies.into_iter().collect();
        c
    }

    /// 1 -> (2 -> 3), 4, 5 -> 6
    fn sample_forest() -> Forest {
        im::vector![
            with(
                comment(1, None),
                vec![with(comment(2, Some(1)), vec![comment(3, Some(2))])],
            ),
            comment(4, None),
            with(comment(5, None), vec![comment(6, Some(5))]),
        ]
    }

    fn ids(store: &CommentStore) -> Vec<(usize, i64)> {
        store.walk().map(|(d, c)| (d, c.id.0)).collect()
    }

    #[test]
    fn reply_to_deep_comment() {
        let forest = sample_forest();
        let res = insert_reply(&forest, CommentId(3), comment(7, Some(3)));

        let three = Comment::find(&res, CommentId(3)).unwrap();
        assert_eq!(three.replies.len(), 1);
        assert_eq!(three.replies[0].id, CommentId(7));

        // untouched siblings are equal, the input is unchanged
        assert_eq!(res[1], forest[1]);
        assert_eq!(res[2], forest[2]);
        assert!(Comment::find(&forest, CommentId(7)).is_none());
    }

    #[test]
    fn reply_appends_last() {
        let forest = sample_forest();
        let res = insert_reply(&forest, CommentId(5), comment(8, Some(5)));
        let ids = res[2].replies.iter().map(|c| c.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![6, 8]);
    }

    #[test]
    fn reply_chain_under_leaf() {
        let forest = sample_forest();
        let res = insert_reply(&forest, CommentId(4), comment(9, Some(4)));
        let res = insert_reply(&res, CommentId(9), comment(10, Some(9)));

        let four = &res[1];
        assert_eq!(four.replies.len(), 1);
        assert_eq!(four.replies[0].id, CommentId(9));
        assert_eq!(four.replies[0].replies.len(), 1);
        assert_eq!(four.replies[0].replies[0].id, CommentId(10));
        assert!(four.replies[0].replies[0].replies.is_empty());
        assert_eq!(res[0], forest[0]);
        assert_eq!(res[2], forest[2]);
    }

    #[test]
    fn reply_to_unknown_parent() {
        let forest = sample_forest();
        let res = insert_reply(&forest, CommentId(42), comment(11, Some(42)));
        assert_eq!(res, forest);
        assert_eq!(insert_reply(&Forest::new(), CommentId(1), comment(2, Some(1))), Forest::new());
    }

    #[test]
    fn root_is_prepended() {
        let forest = sample_forest();
        let res = insert_root(&forest, comment(12, None));
        let roots = res.iter().map(|c| c.id.0).collect::<Vec<_>>();
        assert_eq!(roots, vec![12, 1, 4, 5]);
    }

    #[test]
    fn walk_order() {
        let mut store = CommentStore::new();
        assert_eq!(ids(&store), vec![]);
        store.replace(SortState::default(), sample_forest());
        assert_eq!(
            ids(&store),
            vec![(0, 1), (1, 2), (2, 3), (0, 4), (0, 5), (1, 6)],
        );
    }

    #[test]
    fn merge() {
        let mut store = CommentStore::new();
        store.replace(SortState::default(), sample_forest());

        assert!(store.merge(Some(CommentId(2)), comment(13, Some(2))));
        assert_eq!(store.find(CommentId(2)).unwrap().replies.len(), 2);

        assert!(store.merge(None, comment(14, None)));
        assert_eq!(store.forest()[0].id, CommentId(14));

        let before = store.forest().clone();
        assert!(!store.merge(Some(CommentId(99)), comment(15, Some(99))));
        assert_eq!(*store.forest(), before);
    }
}
