use proptest::prelude::*;
use routeplane::envoy::order_groups;
use routeplane::model::RouteGroup;

fn groups_from(weights: &[i64]) -> Vec<RouteGroup> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| RouteGroup::new(format!("/g{}", i), *w))
        .collect()
}

fn input_position(group: &RouteGroup) -> usize {
    group.prefix.trim_start_matches("/g").parse().expect("fixture prefix")
}

#[test]
fn weights_1_3_3_2_reverse_ties() {
    let groups = groups_from(&[1, 3, 3, 2]);
    let order: Vec<usize> = order_groups(&groups).into_iter().map(input_position).collect();
    assert_eq!(order, vec![2, 1, 3, 0]);
}

proptest! {
    #[test]
    fn weights_never_increase(weights in prop::collection::vec(-5i64..5, 0..32)) {
        let groups = groups_from(&weights);
        let ordered = order_groups(&groups);
        prop_assert_eq!(ordered.len(), groups.len());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].group_weight >= pair[1].group_weight);
        }
    }

    #[test]
    fn equal_weights_come_out_in_reverse_input_order(weights in prop::collection::vec(0i64..3, 0..32)) {
        let groups = groups_from(&weights);
        let ordered = order_groups(&groups);
        for pair in ordered.windows(2) {
            if pair[0].group_weight == pair[1].group_weight {
                prop_assert!(input_position(pair[0]) > input_position(pair[1]));
            }
        }
    }

    #[test]
    fn ordering_matches_ascending_sort_reversed(weights in prop::collection::vec(any::<i64>(), 0..16)) {
        let groups = groups_from(&weights);
        let mut expected: Vec<usize> = (0..weights.len()).collect();
        expected.sort_by_key(|&i| weights[i]);
        expected.reverse();

        let actual: Vec<usize> = order_groups(&groups).into_iter().map(input_position).collect();
        prop_assert_eq!(actual, expected);
    }
}
