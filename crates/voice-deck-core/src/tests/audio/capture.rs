use crate::{
    AudioError, CaptureDevice, MicrophoneCapture, audio::capture::push_capped, decode_wav,
};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// WHAT: Buffer keeps the start of the memo once the cap is reached
/// WHY: The stored clip must be the first `max_seconds` the user said
#[test]
fn given_buffer_near_cap_when_pushing_samples_then_only_what_fits_kept() {
    // Given: A 4800-sample cap with 4000 samples of 0.0 already in
    let cap = 4800;
    let mut buf: VecDeque<f32> = std::iter::repeat_n(0.0, 4000).collect();

    // When: Pushing 1024 samples of 1.0, then more after the cap
    push_capped(&mut buf, &[1.0; 1024], cap);
    push_capped(&mut buf, &[2.0; 16], cap);

    // Then: Exactly at cap, the opening samples untouched, late ones dropped
    assert_eq!(buf.len(), cap);
    assert!(buf[0].abs() < f32::EPSILON);
    assert!(buf[3999].abs() < f32::EPSILON);
    assert!((buf[4000] - 1.0).abs() < f32::EPSILON);
    assert!((buf[cap - 1] - 1.0).abs() < f32::EPSILON);
}

/// WHAT: Pushing below the cap keeps every sample in order
/// WHY: Normal recordings must be captured in full
#[test]
fn given_empty_buffer_when_pushing_below_cap_then_all_samples_kept() {
    let mut buf = VecDeque::new();

    push_capped(&mut buf, &[0.1, 0.2], 10);
    push_capped(&mut buf, &[0.3], 10);

    assert_eq!(buf, VecDeque::from(vec![0.1, 0.2, 0.3]));
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: Captured audio is never silently lost on mutex poison
#[test]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(VecDeque::from(vec![0.5f32; 100])));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from poisoned lock using unwrap_or_else
    let recovered = buf.lock().unwrap_or_else(|e| e.into_inner());

    // Then: Original data is fully preserved
    assert_eq!(recovered.len(), 100);
    assert!(recovered.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Concurrent bounded writes stay within the cap
/// WHY: The audio callback and stop() contend for the same buffer
#[test]
fn given_concurrent_writers_when_pushing_capped_then_no_corruption() {
    // Given: Shared buffer with a cap smaller than the total written
    let cap = 100_000;
    let buf = Arc::new(Mutex::new(VecDeque::with_capacity(cap)));
    let mut handles = vec![];

    // When: 4 threads write 1000 batches of 48 samples each concurrently
    for i in 0..4u8 {
        let buf_clone = Arc::clone(&buf);
        handles.push(std::thread::spawn(move || {
            let batch = [f32::from(i); 48];
            for _ in 0..1000 {
                let mut b = buf_clone.lock().unwrap_or_else(|e| e.into_inner());
                push_capped(&mut b, &batch, cap);
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    // Then: 192,000 samples written, exactly the cap kept, all finite
    let b = buf.lock().unwrap();
    assert_eq!(b.len(), cap);
    assert!(b.iter().all(|s| s.is_finite()));
}

/// WHAT: Stop without start reports that nothing was captured
/// WHY: The controller turns this into an aborted capture
#[test]
fn given_idle_capture_when_stopped_then_no_audio_captured() {
    let mut capture = MicrophoneCapture::new(None, 5);

    let result = capture.stop();

    assert!(matches!(result, Err(AudioError::NoAudioCaptured { .. })));
    assert!(!capture.is_active());
}

/// WHAT: A configured input name that matches nothing is a device error
/// WHY: A typo in the config is not a permission problem
#[test]
fn given_unknown_input_name_when_starting_then_device_error_not_permission() {
    // Given: A device name no host exposes
    let mut capture = MicrophoneCapture::new(Some("no such microphone 7f3a".to_string()), 5);

    // When: Starting
    let result = capture.start();

    // Then: DeviceError, and the microphone was never opened
    assert!(matches!(result, Err(AudioError::DeviceError { .. })));
    assert!(!capture.is_active());
}

/// WHAT: The capture reports its limit to the session
/// WHY: The session stops the recording when the buffer is full
#[test]
fn given_capture_with_limit_when_asked_then_limit_reported() {
    assert_eq!(MicrophoneCapture::new(None, 42).max_seconds(), Some(42));
    assert_eq!(MicrophoneCapture::new(None, 0).max_seconds(), Some(1));
}

/// WHAT: Real microphone capture produces a decodable clip
/// WHY: Verifies the cpal stream and the WAV encoder end to end
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn given_default_microphone_when_capturing_briefly_then_clip_decodes() {
    // Given: The default input device
    let mut capture = MicrophoneCapture::new(None, 5);

    // When: Capturing for 200 ms
    capture.start().unwrap();
    assert!(capture.is_active());
    assert!(matches!(
        capture.start(),
        Err(AudioError::CaptureBusy { .. })
    ));
    std::thread::sleep(std::time::Duration::from_millis(200));
    let clip = capture.stop().unwrap();

    // Then: The clip is a WAV with some audio in it
    assert!(!capture.is_active());
    let decoded = decode_wav(&clip).unwrap();
    assert!(decoded.frames() > 0);
}
