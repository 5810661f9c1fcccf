//! Route group evaluation order

use crate::model::RouteGroup;

/// Order route groups for evaluation, highest weight first.
///
/// The groups are stable-sorted by ascending weight and the whole sequence is
/// then reversed, so groups sharing a weight come out in the reverse of their
/// input order. Data planes evaluate routes first-match-wins, and existing
/// configurations rely on this tie order.
pub fn order_groups<'a, I>(groups: I) -> Vec<&'a RouteGroup>
where
    I: IntoIterator<Item = &'a RouteGroup>,
{
    let mut ordered: Vec<&RouteGroup> = groups.into_iter().collect();
    ordered.sort_by_key(|group| group.group_weight);
    ordered.reverse();
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(groups: &[&RouteGroup]) -> Vec<String> {
        groups.iter().map(|g| g.prefix.clone()).collect()
    }

    #[test]
    fn test_highest_weight_first() {
        let groups = vec![
            RouteGroup::new("/a", 1),
            RouteGroup::new("/b", 5),
            RouteGroup::new("/c", 3),
        ];
        assert_eq!(prefixes(&order_groups(&groups)), vec!["/b", "/c", "/a"]);
    }

    #[test]
    fn test_equal_weights_are_reversed() {
        let groups = vec![
            RouteGroup::new("/w1", 1),
            RouteGroup::new("/A", 3),
            RouteGroup::new("/B", 3),
            RouteGroup::new("/w2", 2),
        ];
        assert_eq!(prefixes(&order_groups(&groups)), vec!["/B", "/A", "/w2", "/w1"]);
    }

    #[test]
    fn test_empty_input() {
        let groups: Vec<RouteGroup> = Vec::new();
        assert!(order_groups(&groups).is_empty());
    }
}
