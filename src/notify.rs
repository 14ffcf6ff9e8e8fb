use tracing::warn;

use crate::duration::format_duration;
use crate::sequence::CountdownSpec;

pub fn send_completion(spec: &CountdownSpec) {
    let summary = if spec.name.is_empty() {
        "timer complete".to_string()
    } else {
        format!("{} complete", spec.name)
    };

    let mut notification = notify_rust::Notification::new();
    notification
        .summary(&summary)
        .body(&format!("{} timer finished", format_duration(spec.duration)))
        .appname("timer");

    #[cfg(target_os = "macos")]
    notification.sound_name("Glass");

    if let Err(e) = notification.show() {
        warn!("failed to send notification: {e}");
    }
}
