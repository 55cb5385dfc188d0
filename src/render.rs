//! Streaming assembled scenes to a Rerun viewer.

use crate::scene::Scene;

/// Spawn a Rerun viewer and stream `scene` to it.
///
/// # Errors
///
/// Propagates failures to spawn the viewer process or to transmit the scene.
pub fn show(scene: &Scene, application_id: &str) -> rerun::RecordingStreamResult<()> {
    let recording = rerun::RecordingStreamBuilder::new(application_id).spawn()?;
    log_scene(&recording, scene)
}

/// Log `scene` onto an existing recording stream.
///
/// Markers become one labelled point series; segments become one line-strip
/// series. Markers without a position are left out of the stream, matching
/// the scene contract that a renderer has nowhere to place them.
///
/// # Errors
///
/// Propagates transmission failures from the recording stream.
pub fn log_scene(
    recording: &rerun::RecordingStream,
    scene: &Scene,
) -> rerun::RecordingStreamResult<()> {
    let mut points: Vec<[f32; 3]> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    for marker in &scene.markers {
        if let Some(position) = marker.position {
            points.push([position.x as f32, position.y as f32, position.z as f32]);
            labels.push(marker.label.clone());
        }
    }
    recording.log(
        "structure/nodes",
        &rerun::Points3D::new(points).with_labels(labels),
    )?;

    let strips: Vec<Vec<[f32; 3]>> = scene
        .segments
        .iter()
        .map(|segment| {
            vec![
                [
                    segment.start.x as f32,
                    segment.start.y as f32,
                    segment.start.z as f32,
                ],
                [
                    segment.end.x as f32,
                    segment.end.y as f32,
                    segment.end.z as f32,
                ],
            ]
        })
        .collect();
    recording.log("structure/bars", &rerun::LineStrips3D::new(strips))?;

    Ok(())
}
