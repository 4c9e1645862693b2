use hypertext::prelude::*;

use crate::feedback::Status;

/// Badge showing the lifecycle state of a feedback item.
pub struct StatusBadge {
    pub status: Status,
}

impl Renderable for StatusBadge {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let (label, class) = match self.status {
            Status::Pending => ("Pending", "badge text-bg-warning"),
            Status::Replied => ("Replied", "badge text-bg-info"),
            Status::Acknowledged => ("Acknowledged", "badge text-bg-success"),
        };

        maud!({
            span class=(class) {
                (label)
            }
        })
        .render_to(buffer);
    }
}
