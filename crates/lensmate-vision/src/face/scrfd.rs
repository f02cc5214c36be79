//! OpenVINO SCRFD 얼굴 검출기.
//!
//! OpenVINO 핸들은 스레드 간 이동이 불가하므로 전용 추론 스레드가
//! 런타임과 컴파일된 모델을 소유하고, 요청은 채널로 전달한다.

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use lensmate_core::error::CoreError;
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::face_detector::FaceDetector;
use openvino::{CompiledModel, Core, ElementType, InferRequest, Shape, Tensor};
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::{
    decode_level, letterbox, non_max_suppression, to_input_tensor, FaceBox, ScrfdLayout,
    INPUT_SIZE, NMS_IOU,
};
use crate::resize;

type Job = (Frame, oneshot::Sender<Result<u32, CoreError>>);

fn ov<E: std::fmt::Debug>(stage: &'static str) -> impl Fn(E) -> CoreError {
    move |e| CoreError::Internal(format!("OpenVINO {stage} 실패: {e:?}"))
}

/// SCRFD(det_*.onnx / IR) 모델 기반 얼굴 수 검출기
pub struct ScrfdFaceDetector {
    jobs: mpsc::Sender<Job>,
}

impl ScrfdFaceDetector {
    /// 모델을 로드하고 추론 스레드 시작. 로드 실패는 즉시 반환
    pub fn load(model_path: &Path, device: &str, confidence: f32) -> Result<Self, CoreError> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), CoreError>>();
        let path = model_path.to_path_buf();
        let device = device.to_string();

        thread::Builder::new()
            .name("lensmate-scrfd".to_string())
            .spawn(move || {
                let mut worker = match Worker::open(&path, &device, confidence) {
                    Ok(worker) => {
                        let _ = ready_tx.send(Ok(()));
                        worker
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                for (frame, reply) in queue {
                    let _ = reply.send(worker.count(&frame));
                }
                debug!("SCRFD 추론 스레드 종료");
            })
            .map_err(|e| CoreError::Internal(format!("SCRFD 스레드 생성 실패: {e}")))?;

        ready_rx
            .recv()
            .map_err(|_| CoreError::Internal("SCRFD 스레드가 응답 없이 종료".to_string()))??;
        info!(model = %model_path.display(), confidence, "SCRFD 얼굴 검출기 준비");
        Ok(Self { jobs })
    }
}

#[async_trait]
impl FaceDetector for ScrfdFaceDetector {
    async fn count_faces(&self, frame: &Frame) -> Result<u32, CoreError> {
        let (reply, answer) = oneshot::channel();
        self.jobs
            .send((frame.clone(), reply))
            .map_err(|_| CoreError::Internal("SCRFD 추론 스레드 중단".to_string()))?;
        answer
            .await
            .map_err(|_| CoreError::Internal("SCRFD 응답 유실".to_string()))?
    }
}

/// 추론 스레드 전용 상태
struct Worker {
    model: CompiledModel,
    confidence: f32,
    _core: Core,
}

impl Worker {
    fn open(path: &Path, device: &str, confidence: f32) -> Result<Self, CoreError> {
        let path = path.to_str().ok_or_else(|| {
            CoreError::Config(format!("모델 경로가 UTF-8이 아님: {}", path.display()))
        })?;

        let mut core = Core::new().map_err(ov("런타임 초기화"))?;
        let model = core.read_model_from_file(path, "").map_err(ov("모델 읽기"))?;
        let compiled = core
            .compile_model(&model, device.into())
            .map_err(ov("모델 컴파일"))?;

        Ok(Self {
            model: compiled,
            confidence,
            _core: core,
        })
    }

    fn count(&mut self, frame: &Frame) -> Result<u32, CoreError> {
        let input = letterbox(&resize::frame_to_rgba(frame)?, INPUT_SIZE)?;
        let data = to_input_tensor(&input);

        let side = INPUT_SIZE as i64;
        let shape = Shape::new(&[1, 3, side, side]).map_err(ov("입력 shape"))?;
        let mut tensor = Tensor::new(ElementType::F32, &shape).map_err(ov("입력 텐서"))?;
        let raw = tensor.get_raw_data_mut().map_err(ov("입력 텐서"))?;
        for (dst, v) in raw.chunks_exact_mut(4).zip(&data) {
            dst.copy_from_slice(&v.to_ne_bytes());
        }

        let mut request = self
            .model
            .create_infer_request()
            .map_err(ov("추론 요청"))?;
        request.set_input_tensor(&tensor).map_err(ov("입력 설정"))?;
        request.infer().map_err(ov("추론"))?;

        let faces = non_max_suppression(self.decode(&request)?, NMS_IOU);
        debug!(faces = faces.len(), "SCRFD 검출");
        Ok(faces.len() as u32)
    }

    fn decode(&self, request: &InferRequest) -> Result<Vec<FaceBox>, CoreError> {
        let outputs = (0..16)
            .take_while(|&i| request.get_output_tensor_by_index(i).is_ok())
            .count();
        let layout = ScrfdLayout::from_output_count(outputs)
            .ok_or_else(|| CoreError::Internal(format!("알 수 없는 SCRFD 출력 수: {outputs}")))?;

        let mut boxes = Vec::new();
        for (level, &stride) in layout.strides.iter().enumerate() {
            let (score_idx, box_idx) = layout.output_indices(level);
            let scores = read_f32(
                &request
                    .get_output_tensor_by_index(score_idx)
                    .map_err(ov("점수 출력"))?,
            )?;
            let distances = read_f32(
                &request
                    .get_output_tensor_by_index(box_idx)
                    .map_err(ov("박스 출력"))?,
            )?;
            boxes.extend(decode_level(
                &scores,
                &distances,
                stride,
                layout.anchors_per_cell,
                self.confidence,
            ));
        }
        Ok(boxes)
    }
}

fn read_f32(tensor: &Tensor) -> Result<Vec<f32>, CoreError> {
    let raw = tensor.get_raw_data().map_err(ov("출력 읽기"))?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
