pub mod turntable_camera;
