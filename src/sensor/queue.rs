//! Lock-free sample transport between a driver thread and the pipeline.
//!
//! The driver side pushes samples as the device produces them; the pipeline
//! side polls with a bounded retry budget so a stalled device surfaces as
//! `SensorUnavailable` rather than a hung cycle.

use rtrb::{Consumer, PopError, Producer, PushError, RingBuffer};
use std::thread;
use std::time::Duration;

use super::{Sample, SensorDriver};
use crate::config::SensorConfig;
use crate::error::SensorError;

/// Create a connected producer/consumer pair for sample transfer
pub fn sample_channel(config: &SensorConfig) -> (SampleProducer, QueueSensor) {
    let (producer, consumer) = RingBuffer::new(config.queue_capacity.max(1));
    (
        SampleProducer { producer },
        QueueSensor {
            consumer,
            retry_budget: config.retry_budget,
            poll_interval: Duration::from_micros(config.poll_interval_us),
        },
    )
}

/// Driver-side handle that enqueues fresh samples
pub struct SampleProducer {
    producer: Producer<Sample>,
}

impl SampleProducer {
    /// Enqueue a sample without blocking
    ///
    /// Returns `false` and drops the sample when the queue is full.
    pub fn push(&mut self, sample: Sample) -> bool {
        match self.producer.push(sample) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                tracing::warn!("[SensorQueue] Queue full, dropping sample");
                false
            }
        }
    }

    /// Free slots currently available
    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

/// Pipeline-side sensor reading from the sample queue
pub struct QueueSensor {
    consumer: Consumer<Sample>,
    retry_budget: u32,
    poll_interval: Duration,
}

impl SensorDriver for QueueSensor {
    fn read_sample(&mut self) -> Result<Sample, SensorError> {
        for _ in 0..=self.retry_budget {
            match self.consumer.pop() {
                Ok(sample) => return Ok(sample),
                Err(PopError::Empty) => {
                    if self.consumer.is_abandoned() {
                        return Err(SensorError::Disconnected);
                    }
                    if !self.poll_interval.is_zero() {
                        thread::sleep(self.poll_interval);
                    }
                }
            }
        }

        Err(SensorError::SensorUnavailable {
            retries: self.retry_budget,
        })
    }
}
