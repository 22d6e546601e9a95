use crate::types::{Line, TextBox};

/// Group boxes into top-to-bottom lines.
///
/// A box joins the current line while its vertical center stays within
/// `overlap_ratio × median box height` of the line's running average center.
/// Equal positions keep input order, so the result is deterministic.
pub fn cluster_lines(boxes: &[TextBox], overlap_ratio: f32) -> Vec<Line> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let threshold = overlap_ratio * median_height(boxes);

    // (input index, center y); sort_by is stable, ties keep input order.
    let mut order: Vec<(usize, f32)> = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| (i, b.bbox.center().y))
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut running_center = 0.0f32;
    for (idx, center) in order {
        match groups.last_mut() {
            Some(group) if (center - running_center).abs() <= threshold => {
                group.push(idx);
                running_center += (center - running_center) / group.len() as f32;
            }
            _ => {
                groups.push(vec![idx]);
                running_center = center;
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, mut members)| {
            members.sort_by(|&a, &b| {
                boxes[a]
                    .bbox
                    .x_min()
                    .total_cmp(&boxes[b].bbox.x_min())
                    .then(a.cmp(&b))
            });
            let line_boxes: Vec<TextBox> = members.iter().map(|&i| boxes[i].clone()).collect();
            let text = line_boxes
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Line { index, boxes: line_boxes, text }
        })
        .collect()
}

fn median_height(boxes: &[TextBox]) -> f32 {
    let mut heights: Vec<f32> = boxes.iter().map(|b| b.bbox.height()).collect();
    heights.sort_by(f32::total_cmp);
    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) / 2.0
    } else {
        heights[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn tb(text: &str, x: f32, y: f32, w: f32, h: f32) -> TextBox {
        TextBox::new(text, 0.9, BoundingBox::from_rect(x, y, w, h))
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(cluster_lines(&[], 0.5).is_empty());
    }

    #[test]
    fn single_box_is_its_own_line() {
        let lines = cluster_lines(&[tb("alone", 0.0, 0.0, 10.0, 10.0)], 0.5);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].index, 0);
        assert_eq!(lines[0].text, "alone");
    }

    #[test]
    fn joins_row_left_to_right() {
        let boxes = vec![
            tb("$5.50", 200.0, 101.0, 40.0, 20.0),
            tb("Total", 0.0, 100.0, 50.0, 20.0),
            tb("STARBUCKS", 0.0, 0.0, 120.0, 20.0),
        ];
        let lines = cluster_lines(&boxes, 0.5);
        assert_eq!(texts(&lines), ["STARBUCKS", "Total $5.50"]);
        assert_eq!(lines[1].index, 1);
    }

    #[test]
    fn threshold_scales_with_median_height() {
        // Same layout at 1x and 4x resolution clusters identically.
        let at = |s: f32| {
            vec![
                tb("A", 0.0, 0.0, 10.0 * s, 10.0 * s),
                tb("B", 20.0 * s, 4.0 * s, 10.0 * s, 10.0 * s),
                tb("C", 0.0, 30.0 * s, 10.0 * s, 10.0 * s),
            ]
        };
        assert_eq!(texts(&cluster_lines(&at(1.0), 0.5)), ["A B", "C"]);
        assert_eq!(texts(&cluster_lines(&at(4.0), 0.5)), ["A B", "C"]);
    }

    #[test]
    fn lines_partition_the_boxes() {
        let boxes: Vec<TextBox> = (0..12)
            .map(|i| tb(&format!("b{i}"), (i % 3) as f32 * 30.0, (i / 3) as f32 * 25.0, 20.0, 20.0))
            .collect();
        let lines = cluster_lines(&boxes, 0.5);
        assert_eq!(lines.len(), 4);
        let total: usize = lines.iter().map(|l| l.boxes.len()).sum();
        assert_eq!(total, boxes.len());
    }

    #[test]
    fn duplicate_positions_keep_input_order() {
        let a = tb("first", 0.0, 0.0, 10.0, 10.0);
        let b = tb("second", 0.0, 0.0, 10.0, 10.0);
        let lines = cluster_lines(&[a.clone(), b.clone()], 0.5);
        assert_eq!(texts(&lines), ["first second"]);

        // Permuting the duplicates permutes only their order, not membership.
        let swapped = cluster_lines(&[b, a], 0.5);
        assert_eq!(swapped.len(), 1);
        assert_eq!(swapped[0].boxes.len(), 2);
        assert_eq!(swapped[0].text, "second first");
    }

    #[test]
    fn deterministic_across_runs() {
        let boxes = vec![
            tb("x", 5.0, 50.0, 10.0, 12.0),
            tb("y", 0.0, 3.0, 10.0, 9.0),
            tb("z", 9.0, 52.0, 10.0, 11.0),
        ];
        assert_eq!(cluster_lines(&boxes, 0.5), cluster_lines(&boxes, 0.5));
    }

    #[test]
    fn line_height_is_box_average() {
        let lines = cluster_lines(
            &[tb("a", 0.0, 0.0, 10.0, 10.0), tb("b", 20.0, 0.0, 10.0, 14.0)],
            0.5,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].height(), 12.0);
    }
}
